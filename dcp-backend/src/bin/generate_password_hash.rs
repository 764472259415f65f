// src/bin/generate_password_hash.rs
use dcp_backend::utils::password::PasswordManager;
use std::env;
use std::io::{self, Write};
use std::process;

fn read_password() -> io::Result<String> {
    print!("Enter password to hash: ");
    io::stdout().flush()?;

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    Ok(password.trim().to_string())
}

fn main() {
    dotenvy::dotenv().ok();

    // コマンドライン引数、なければ標準入力から取得
    let password = match env::args().nth(1) {
        Some(password) => password,
        None => read_password().unwrap_or_else(|e| {
            eprintln!("Error reading password: {}", e);
            process::exit(1);
        }),
    };

    if password.is_empty() {
        eprintln!("Error: Password cannot be empty");
        process::exit(1);
    }

    // サーバーと同じ Argon2 パラメータ・パスワードポリシーを使う
    let manager = PasswordManager::from_env().unwrap_or_else(|e| {
        eprintln!("Error loading password configuration: {}", e);
        process::exit(1);
    });

    match manager.hash_password(&password) {
        Ok(hash) => {
            println!("\n=== Password Hash Generated ===");
            println!("Hash: {}", hash);
            println!("\nStore it in users.password_hash for a staff account.");
        }
        Err(e) => {
            eprintln!("Error generating password hash: {}", e);
            process::exit(1);
        }
    }
}
