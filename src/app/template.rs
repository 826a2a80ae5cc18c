//! Path template placeholders
//!
//! - `@t` target
//! - `@w` config name
//! - `@n` app directory base name
//! - `@f` app directory path with separators replaced by `_`
//! - `@i` dispatch index (left untouched until the app is dispatched)

use super::AppRecord;

pub fn expand_placeholders(template: &str, app: &AppRecord) -> String {
    let mut out = template.to_string();

    if let Some(index) = app.index {
        out = out.replace("@i", &index.to_string());
    }

    let name = app
        .directory
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    out.replace("@t", &app.target)
        .replace("@w", &app.config_name)
        .replace("@n", &name)
        .replace("@f", &flatten_path(&app.directory.to_string_lossy()))
}

fn flatten_path(path: &str) -> String {
    path.trim_start_matches(&['/', '\\'][..])
        .replace(&['/', '\\'][..], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppTemplate;
    use std::path::{Path, PathBuf};

    fn app() -> AppRecord {
        AppTemplate::default().instantiate(
            Path::new("examples/get-started/blink"),
            "esp32s3",
            "psram",
            Some(PathBuf::from("sdkconfig.ci.psram")),
        )
    }

    #[test]
    fn test_expand_all_placeholders() {
        let mut a = app();
        a.index = Some(4);
        assert_eq!(
            a.expand("out/@f/@n_@t_@w_@i.log"),
            "out/examples_get-started_blink/blink_esp32s3_psram_4.log"
        );
    }

    #[test]
    fn test_index_kept_until_dispatch() {
        assert_eq!(app().expand("log_@i.txt"), "log_@i.txt");
    }

    #[test]
    fn test_plain_template_unchanged() {
        assert_eq!(app().expand("build"), "build");
    }

    #[test]
    fn test_flatten_absolute_path() {
        assert_eq!(flatten_path("/home/user/app"), "home_user_app");
    }
}
