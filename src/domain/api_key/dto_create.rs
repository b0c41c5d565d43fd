#[derive(Debug, Clone)]
pub struct CreateApiKeyDto {
    pub name: String,
    pub user_id: String,
    pub secret_hash: String,
    pub last4: String,
}
