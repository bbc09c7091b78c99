//! Shareable verification links.
//!
//! Links point at the `verify` route below a base URL and carry the token in
//! the `proof` query parameter. Tokens pasted as a URL fragment are accepted
//! too.

use url::Url;

use crate::{encode, LinkError, Proof};

/// Query parameter holding the token.
pub const PROOF_PARAM: &str = "proof";

/// Route segment of the verifying page.
pub const VERIFY_PATH: &str = "verify";

/// Builds `<base>/verify?proof=<token>` for `proof`.
pub fn share_url(base: &str, proof: &Proof) -> Result<Url, LinkError> {
    share_url_for_token(base, &encode(proof))
}

/// Same as [`share_url`] for an already encoded token.
pub fn share_url_for_token(base: &str, token: &str) -> Result<Url, LinkError> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let mut url = base.join(VERIFY_PATH)?;
    url.query_pairs_mut().clear().append_pair(PROOF_PARAM, token);
    Ok(url)
}

/// Pulls the token out of a shared link.
///
/// Returns `None` when the link carries no token, which the verify entry
/// point reports as a missing field.
pub fn token_from_url(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;

    url.query_pairs()
        .find(|(key, _)| key == PROOF_PARAM)
        .map(|(_, value)| value.into_owned())
        .or_else(|| url.fragment().map(str::to_owned))
        .filter(|token| !token.trim().is_empty())
}
