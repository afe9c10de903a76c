use rand::Rng;

const SECRET_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const SECRET_LEN: usize = 64;
const CLIENT_ID_BYTES: usize = 20;

/// Random public client identifier (40 hex chars)
pub fn generate_client_id() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..CLIENT_ID_BYTES).map(|_| rng.gen()).collect();
    hex::encode(bytes)
}

/// Random alphanumeric client secret
pub fn generate_client_secret() -> String {
    let mut rng = rand::thread_rng();
    (0..SECRET_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..SECRET_CHARSET.len());
            SECRET_CHARSET[idx] as char
        })
        .collect()
}

/// A fresh secret guaranteed to differ from `previous`
pub fn rotate_client_secret(previous: &str) -> String {
    loop {
        let secret = generate_client_secret();
        if secret != previous {
            return secret;
        }
    }
}
