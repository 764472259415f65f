// src/utils/otp.rs

use rand::Rng;

/// 数字のみの OTP コードを生成
pub fn generate_otp_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
