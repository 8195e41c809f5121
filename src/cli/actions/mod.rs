pub mod server;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        base_url: String,
        allowed_email_domain: String,
        google_client_id: String,
        google_client_secret: SecretString,
        slack_token: SecretString,
    },
}
