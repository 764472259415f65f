// src/domain/otp_type.rs

string_enum! {
    pub enum OtpType {
        Inscription => "inscription",
        Connexion => "connexion",
        ResetPassword => "reset_password",
    }
}

impl Default for OtpType {
    fn default() -> Self {
        Self::Inscription
    }
}
