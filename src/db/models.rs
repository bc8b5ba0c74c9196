use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub mpin_secure_hash: Option<String>,
    pub atm_card_secure_hash: Option<String>,
    pub atm_card_last4: Option<String>,
}

/// A row about to be inserted; `id` is assigned by the database.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub mpin_secure_hash: Option<String>,
    pub atm_card_secure_hash: Option<String>,
    pub atm_card_last4: Option<String>,
}
