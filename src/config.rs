//! Environment-driven configuration

/// Runtime configuration for the assistant
#[derive(Debug, Clone)]
pub struct Config {
    pub mistral_api_key: Option<String>,
    pub chat_model: String,
    pub embed_model: String,
    /// Conversation checkpoint database
    pub conversations_db: String,
    /// Showtime timetable database
    pub timetable_db: String,
    pub chroma_url: String,
    pub chroma_collection: String,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = std::env::var("MARQUEE_DATA_DIR").unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            format!("{home}/.marquee")
        });

        Self {
            mistral_api_key: std::env::var("MISTRAL_API_KEY").ok(),
            chat_model: std::env::var("MARQUEE_CHAT_MODEL")
                .unwrap_or_else(|_| "mistral-large-latest".to_string()),
            embed_model: std::env::var("MARQUEE_EMBED_MODEL")
                .unwrap_or_else(|_| "mistral-embed".to_string()),
            conversations_db: std::env::var("MARQUEE_CONVERSATIONS_DB")
                .unwrap_or_else(|_| format!("{data_dir}/conversations.db")),
            timetable_db: std::env::var("MARQUEE_TIMETABLE_DB")
                .unwrap_or_else(|_| format!("{data_dir}/timetable.db")),
            chroma_url: std::env::var("MARQUEE_CHROMA_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            chroma_collection: std::env::var("MARQUEE_CHROMA_COLLECTION")
                .unwrap_or_else(|_| "movies".to_string()),
        }
    }
}
