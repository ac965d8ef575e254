#[derive(Debug, Clone, PartialEq)]
pub enum OpenAIModel {
    Gpt35Turbo,
    Gpt4oMini,
    Gpt4o,
    Gpt41Mini,
    Override(String),
}

impl Default for OpenAIModel {
    fn default() -> Self { Self::Gpt35Turbo }
}

impl OpenAIModel {
    pub fn id(&self) -> &str {
        match self {
            Self::Gpt35Turbo => "gpt-3.5-turbo",
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Gpt4o => "gpt-4o",
            Self::Gpt41Mini => "gpt-4.1-mini",
            Self::Override(s) => s.as_str(),
        }
    }

    pub fn from_id(id: &str) -> Self {
        match id {
            "gpt-3.5-turbo" => Self::Gpt35Turbo,
            "gpt-4o-mini" => Self::Gpt4oMini,
            "gpt-4o" => Self::Gpt4o,
            "gpt-4.1-mini" => Self::Gpt41Mini,
            other => Self::Override(other.to_string()),
        }
    }
}
