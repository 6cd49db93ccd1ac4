//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::content::loader::IMAGE_URL_DIR;
use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# Site
title: log file
description: A markdown blog.
language: en

# URL
root: /

# Directory
posts_dir: posts
public_dir: public
output_dir: dist

# Writing
new_post_name: :title.md

# Rendering
default_theme: dark
highlight:
  theme: github-dark
  line_number: false
markdown:
  tables: true
  task_lists: true
  autolinks: true
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("posts"))?;
    fs::create_dir_all(target_dir.join("public").join(IMAGE_URL_DIR))?;

    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        tracing::info!("Keeping existing {:?}", config_path);
    } else {
        fs::write(&config_path, DEFAULT_CONFIG)?;
    }

    let sample_path = target_dir.join("posts/hello-world.md");
    if !sample_path.exists() {
        let today = chrono::Local::now().format("%Y-%m-%d");
        let sample_post = format!(
            r#"---
title: Hello World
date: {}
description: Your very first post.
---

Welcome! Every markdown file in `posts/` becomes a post. Its file name is the
post's URL, and an image at `public/images/posts/hello-world.jpg` becomes its
cover.

## Code

```rust
fn main() {{
    println!("Hello, world!");
}}
```

## Tasks

- [x] Create the site
- [ ] Write something
"#,
            today
        );
        fs::write(&sample_path, sample_post)?;
    }

    Ok(())
}
