use crate::utils::error::Result;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Where `path` ends up, for messages shown to the user.
    fn location(&self, path: &str) -> String;
}

/// Line-oriented user terminal. `None` from a read means the user ended input.
pub trait Terminal {
    fn read_line(&mut self, prompt: &str) -> Option<String>;
    fn read_secret(&mut self, prompt: &str) -> Option<String>;
    fn write_line(&mut self, text: &str);
}

pub trait ConfigProvider: Send + Sync {
    fn data_dir(&self) -> &str;
    fn report_dir(&self) -> &str;
    fn window_days(&self) -> u32;
    fn archive_reports(&self) -> bool;
}
