use renet::transport::NETCODE_USER_DATA_BYTES;

/// Display name carried in the netcode user data block: a little-endian
/// length prefix followed by utf-8 bytes.
pub struct Username(pub String);

impl Username {
    pub fn from_user_data(user_data: &[u8; NETCODE_USER_DATA_BYTES]) -> Self {
        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&user_data[0..8]);
        let len = (u64::from_le_bytes(len_bytes) as usize).min(NETCODE_USER_DATA_BYTES - 8);
        let name = String::from_utf8_lossy(&user_data[8..8 + len]).to_string();
        Username(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_user_data_should_decode_a_length_prefixed_name() {
        let mut user_data = [0u8; NETCODE_USER_DATA_BYTES];
        let name = b"Bilbo";
        user_data[0..8].copy_from_slice(&(name.len() as u64).to_le_bytes());
        user_data[8..8 + name.len()].copy_from_slice(name);

        assert_eq!(Username::from_user_data(&user_data).0, "Bilbo");
    }

    #[test]
    fn from_user_data_should_clamp_an_oversized_length_prefix() {
        let mut user_data = [0u8; NETCODE_USER_DATA_BYTES];
        user_data[0..8].copy_from_slice(&u64::MAX.to_le_bytes());

        let username = Username::from_user_data(&user_data);

        assert_eq!(username.0.len(), NETCODE_USER_DATA_BYTES - 8);
    }
}
