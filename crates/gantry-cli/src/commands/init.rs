//! `gantry init`

use std::fs;
use std::path::Path;

use gantry_config::MANIFEST_FILE;

use crate::cli::{Cli, InitArgs};
use crate::error::{CliError, Result};
use crate::ui;

const MANIFEST_TEMPLATE: &str = r#"# gantry build manifest
# Every table is optional; these are the defaults worth knowing about.

mode = "development"

[paths]
source = "src"
output = "dist"

[entries]
app = "."

[pages]
dir = "pages"
extension = "jinja"

[dev]
port = 3000
open = true
"#;

const INDEX_JS: &str = "console.log('gantry ready');\n";

const APP_CSS: &str = "body {\n  margin: 0;\n  font-family: sans-serif;\n}\n";

const INDEX_PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{{ page }} · gantry</title>
  </head>
  <body>
    <h1>Hello from gantry ({{ mode }})</h1>
  </body>
</html>
"#;

pub fn run(_cli: &Cli, args: &InitArgs) -> Result<()> {
    let root = &args.dir;
    let manifest_path = root.join(MANIFEST_FILE);
    if manifest_path.exists() && !args.force {
        return Err(CliError::AlreadyInitialized {
            path: manifest_path,
        });
    }

    scaffold(root, &manifest_path)?;

    ui::success(&format!("scaffolded project in {}", root.display()));
    ui::info("next: gantry build, or gantry dev to serve with reload");
    Ok(())
}

fn scaffold(root: &Path, manifest_path: &Path) -> Result<()> {
    fs::create_dir_all(root.join("src/pages"))?;
    fs::create_dir_all(root.join("src/styles"))?;

    fs::write(manifest_path, MANIFEST_TEMPLATE)?;
    write_if_missing(&root.join("src/index.js"), INDEX_JS)?;
    write_if_missing(&root.join("src/styles/app.css"), APP_CSS)?;
    write_if_missing(&root.join("src/pages/index.jinja"), INDEX_PAGE)?;
    Ok(())
}

// Source files are never clobbered, even with --force; only the
// manifest is considered replaceable.
fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if !path.exists() {
        fs::write(path, content)?;
    }
    Ok(())
}
