// src/domain/notification_type.rs

string_enum! {
    pub enum TypeNotification {
        ChangementStatut => "changement_statut",
        Assignation => "assignation",
        Feedback => "feedback",
        Rapprochement => "rapprochement",
        Renouvellement => "renouvellement",
        Rapport => "rapport",
    }
}
