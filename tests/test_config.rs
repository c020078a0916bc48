use std::io::Write as _;

use wireline::config::Config;

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.listen_addr, "127.0.0.1:42069");
    assert_eq!(cfg.read_chunk_size, 1024);
    assert_eq!(cfg.initial_buffer_capacity, 8);
    assert_eq!(cfg.chunk_queue_capacity, 16);
    assert_eq!(cfg.chunked_prefix, "/chunked/");
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_config_from_yaml_fills_missing_fields() {
    let cfg = Config::from_yaml_str("listen_addr: \"0.0.0.0:3000\"\nread_chunk_size: 8\n").unwrap();

    assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.read_chunk_size, 8);
    assert_eq!(cfg.initial_buffer_capacity, 8);
    assert_eq!(cfg.log_level, "info");
}

#[test]
fn test_config_rejects_zero_read_size() {
    let result = Config::from_yaml_str("read_chunk_size: 0\n");
    assert!(result.is_err());
}

#[test]
fn test_config_rejects_zero_queue() {
    let result = Config::from_yaml_str("chunk_queue_capacity: 0\n");
    assert!(result.is_err());
}

#[test]
fn test_config_rejects_bad_yaml() {
    let result = Config::from_yaml_str("read_chunk_size: lots\n");
    assert!(result.is_err());
}

#[test]
fn test_config_from_file() {
    let path = std::env::temp_dir().join(format!("wireline-config-{}.yaml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "listen_addr: \"127.0.0.1:8000\"").unwrap();
    writeln!(file, "chunked_prefix: \"/httpbin/\"").unwrap();
    drop(file);

    let cfg = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(cfg.listen_addr, "127.0.0.1:8000");
    assert_eq!(cfg.chunked_prefix, "/httpbin/");
}

#[test]
fn test_config_missing_file_is_error() {
    assert!(Config::from_file("/definitely/not/here.yaml").is_err());
}

#[test]
fn test_config_listen_override_from_env() {
    // Only test in this binary that touches the environment.
    unsafe {
        std::env::remove_var("WIRELINE_CONFIG");
        std::env::set_var("LISTEN", "0.0.0.0:5000");
    }
    let cfg = Config::load().unwrap();
    unsafe {
        std::env::remove_var("LISTEN");
    }

    assert_eq!(cfg.listen_addr, "0.0.0.0:5000");
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1, cfg2);
}
