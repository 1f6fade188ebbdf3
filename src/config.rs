use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Publishable gateway key handed to the hosted checkout UI.
    pub razorpay_key_id: Option<String>,
    /// Server-only secret used for callback signature verification.
    pub razorpay_key_secret: Option<String>,
    pub currency: String,
    pub store_name: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        // Missing gateway keys are reported at checkout time, not at startup.
        let razorpay_key_id = env::var("RAZORPAY_KEY_ID").ok().filter(|k| !k.is_empty());
        let razorpay_key_secret = env::var("RAZORPAY_KEY_SECRET")
            .ok()
            .filter(|k| !k.is_empty());
        let currency = env::var("CURRENCY").unwrap_or_else(|_| "INR".to_string());
        let store_name = env::var("STORE_NAME").unwrap_or_else(|_| "Saree Studio".to_string());
        Ok(Self {
            database_url,
            host,
            port,
            razorpay_key_id,
            razorpay_key_secret,
            currency,
            store_name,
        })
    }
}
