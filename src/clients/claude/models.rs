pub struct ClaudeModels;

impl ClaudeModels {
    pub const SONNET_4: &'static str = "claude-sonnet-4-20250514";
    pub const HAIKU_3_5: &'static str = "claude-3-5-haiku-20241022";
    pub const HAIKU_3_5_LATEST: &'static str = "claude-3-5-haiku-latest";
    pub const SONNET_3_5_V2: &'static str = "claude-3-5-sonnet-20241022";
}
