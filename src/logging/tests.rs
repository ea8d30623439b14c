// 日志系统测试

#[cfg(test)]
mod tests {
    use crate::logging::LoggingSetup;
    use std::path::PathBuf;
    use tracing::Level;

    #[test]
    fn test_parse_level() {
        assert_eq!(LoggingSetup::parse_level("trace"), Level::TRACE);
        assert_eq!(LoggingSetup::parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(LoggingSetup::parse_level("warn"), Level::WARN);
        assert_eq!(LoggingSetup::parse_level("invalid"), Level::INFO);
    }

    #[test]
    fn test_development_config() {
        let config = LoggingSetup::development_config();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, "pretty");
        assert!(LoggingSetup::file_target(&config).is_none());
    }

    #[test]
    fn test_production_file_target() {
        let config = LoggingSetup::production_config();
        let (dir, file_name) = LoggingSetup::file_target(&config).unwrap();
        assert_eq!(dir, PathBuf::from("./logs"));
        assert_eq!(file_name, "profile-studio.log");
    }

    #[test]
    fn test_bare_file_name_uses_current_dir() {
        let mut config = LoggingSetup::production_config();
        config.file_path = Some("studio.log".to_string());

        let (dir, file_name) = LoggingSetup::file_target(&config).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file_name, "studio.log");
    }
}
