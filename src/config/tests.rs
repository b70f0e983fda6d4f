use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_plexdash_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("PLEXDASH_CONFIG_PATH", "/tmp/plexdash-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/plexdash-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("plexdash")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("plexdash")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[server]
url = "https://plex.example:32400"
token = "srv-token"
name = "Living Room"
section_id = "3"

[account]
token = "acct-token"
client_id = "client-1234"

[playback]
autoplay = false

[log]
filter = "plexdash=trace"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("PLEXDASH_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("PLEXDASH__SERVER__URL");

    let s = Settings::load().unwrap();
    assert_eq!(s.server.url, "https://plex.example:32400");
    assert_eq!(s.server.token, "srv-token");
    assert_eq!(s.server.section_id, "3");
    assert_eq!(s.account.client_id, "client-1234");
    assert!(!s.playback.autoplay);
    assert_eq!(s.log.filter, "plexdash=trace");
    assert!(s.ensure_configured().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[server]
url = "http://from-file:32400"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("PLEXDASH_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("PLEXDASH__SERVER__URL", "http://from-env:32400");

    let s = Settings::load().unwrap();
    assert_eq!(s.server.url, "http://from-env:32400");
}

#[test]
fn api_token_prefers_server_token_and_falls_back_to_account() {
    let mut s = Settings::default();
    s.account.token = "acct".to_string();
    assert_eq!(s.api_token(), "acct");

    s.server.token = "srv".to_string();
    assert_eq!(s.api_token(), "srv");
}

#[test]
fn ensure_configured_rejects_missing_url_or_token() {
    let mut s = Settings::default();
    assert!(s.ensure_configured().is_err());

    s.server.url = "http://plex.local:32400".to_string();
    assert!(s.ensure_configured().is_err());

    s.account.token = "acct".to_string();
    assert!(s.ensure_configured().is_ok());
}

#[test]
fn store_round_trips_through_load() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("nested").join("config.toml");
    let _g1 = EnvGuard::set("PLEXDASH_CONFIG_PATH", cfg_path.to_str().unwrap());

    let mut s = Settings::default();
    s.server.url = "http://plex.local:32400".to_string();
    s.server.name = "Garage".to_string();
    s.account.token = "acct".to_string();
    let written = s.store().unwrap();
    assert_eq!(written, cfg_path);

    let loaded = Settings::load().unwrap();
    assert_eq!(loaded.server.url, "http://plex.local:32400");
    assert_eq!(loaded.server.name, "Garage");
    assert_eq!(loaded.api_token(), "acct");
}
