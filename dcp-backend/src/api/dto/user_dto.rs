// src/api/dto/user_dto.rs

use crate::domain::user_role::UserRole;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Le nom est requis."))]
    pub nom: String,

    #[validate(length(min = 1, max = 100, message = "Le prénom est requis."))]
    pub prenom: String,

    #[validate(email(message = "Adresse email invalide."))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Le mot de passe doit contenir entre 8 et 128 caractères."))]
    pub password: String,

    pub role: UserRole,

    #[validate(length(max = 20))]
    pub telephone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub nom: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub prenom: Option<String>,

    #[validate(length(max = 20))]
    pub telephone: Option<String>,

    pub role: Option<UserRole>,

    pub is_active: Option<bool>,

    #[validate(length(min = 8, max = 128, message = "Le mot de passe doit contenir entre 8 et 128 caractères."))]
    pub password: Option<String>,
}
