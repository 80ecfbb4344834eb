use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};

const TOKEN_BYTES: usize = 24;

/// Opaque unguessable bearer token. Never stored or verified server-side;
/// issued on signup and login for the client demo flow only.
pub fn issue_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    Base64UrlUnpadded::encode_string(&buf)
}
