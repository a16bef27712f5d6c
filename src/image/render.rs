//! Dockerfile rendering
//!
//! The install, prune and cache cleanup run in one `RUN` instruction so the
//! toolchain never lands in a committed layer. The manifest is copied on
//! its own before the application tree, which keeps the dependency layer
//! reusable when only the source changes.

use crate::image::descriptor::ImageDescriptor;

const CONTINUATION: &str = " \\\n    && ";

/// Render a descriptor as a Dockerfile
pub fn render_dockerfile(d: &ImageDescriptor) -> String {
    let mut out = String::new();

    out.push_str(&format!("FROM {}\n\n", d.base_image));
    out.push_str(&format!("WORKDIR {}\n\n", d.workdir));

    out.push_str(&format!("COPY {} {}\n", d.manifest, d.manifest));
    out.push_str("RUN ");
    out.push_str(&install_commands(d).join(CONTINUATION));
    out.push_str("\n\n");

    out.push_str(&format!("COPY {}/ .\n\n", d.source_dir.trim_end_matches('/')));

    let argv = serde_json::to_string(&d.entrypoint.argv()).unwrap_or_else(|_| "[]".to_string());
    out.push_str(&format!("CMD {}\n", argv));

    out
}

fn install_commands(d: &ImageDescriptor) -> Vec<String> {
    let mut commands = Vec::new();

    if !d.system_packages.is_empty() {
        commands.push("apt-get update".to_string());
        commands.push(format!(
            "apt-get install -y --no-install-recommends {}",
            d.system_packages.join(" ")
        ));
    }
    commands.push(d.effective_install_command());

    // Cleanup is best-effort: a failed purge must not fail the build.
    let prune = d.effective_prune_packages();
    if !prune.is_empty() {
        commands.push(format!(
            "(apt-get purge -y --auto-remove {} || true)",
            prune.join(" ")
        ));
    }
    if !d.system_packages.is_empty() {
        commands.push("(apt-get clean || true)".to_string());
        commands.push("rm -rf /var/lib/apt/lists/*".to_string());
    }
    commands.push("rm -rf /root/.cache".to_string());

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::descriptor::{DICTIONARY_PACKAGE, TOOLCHAIN_PACKAGE};

    fn instruction_lines(dockerfile: &str) -> Vec<&str> {
        dockerfile
            .lines()
            .filter(|l| !l.is_empty() && !l.starts_with(' '))
            .collect()
    }

    #[test]
    fn test_render_default() {
        let dockerfile = render_dockerfile(&ImageDescriptor::default());
        let lines = instruction_lines(&dockerfile);
        assert_eq!(lines[0], "FROM python:3.11-slim");
        assert_eq!(lines[1], "WORKDIR /app");
        assert_eq!(lines[2], "COPY requirements.txt requirements.txt");
        assert!(lines[3].starts_with("RUN apt-get update"));
        assert_eq!(lines[4], "COPY app/ .");
        assert_eq!(lines[5], r#"CMD ["python","run_experiments.py"]"#);
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_toolchain_removed_in_install_layer() {
        let dockerfile = render_dockerfile(&ImageDescriptor::default());
        let run_start = dockerfile.find("RUN ").unwrap();
        let run_end = dockerfile[run_start..].find("\n\n").unwrap() + run_start;
        let run = &dockerfile[run_start..run_end];

        let install = run.find("--no-install-recommends").unwrap();
        let pip = run.find("pip install").unwrap();
        let purge = run.find("apt-get purge").unwrap();
        assert!(install < pip && pip < purge);
        assert!(run.contains(&format!("--auto-remove {} || true", TOOLCHAIN_PACKAGE)));
        assert!(run.contains(DICTIONARY_PACKAGE));
        assert!(run.contains("rm -rf /var/lib/apt/lists/*"));
    }

    #[test]
    fn test_dictionary_not_purged() {
        let d = ImageDescriptor {
            prune_packages: vec![TOOLCHAIN_PACKAGE.to_string(), DICTIONARY_PACKAGE.to_string()],
            ..ImageDescriptor::default()
        };
        let dockerfile = render_dockerfile(&d);
        let purge_line = dockerfile.lines().find(|l| l.contains("apt-get purge")).unwrap();
        assert!(!purge_line.contains(DICTIONARY_PACKAGE));
    }

    #[test]
    fn test_manifest_copied_before_source() {
        let dockerfile = render_dockerfile(&ImageDescriptor::default());
        let manifest = dockerfile.find("COPY requirements.txt").unwrap();
        let source = dockerfile.find("COPY app/").unwrap();
        assert!(manifest < source);
    }

    #[test]
    fn test_install_follows_manifest_path() {
        let d = ImageDescriptor {
            manifest: "deps/reqs.txt".to_string(),
            ..ImageDescriptor::default()
        };
        let dockerfile = render_dockerfile(&d);
        assert!(dockerfile.contains("COPY deps/reqs.txt deps/reqs.txt\n"));
        assert!(dockerfile.contains("pip install --no-cache-dir -r deps/reqs.txt"));
        assert!(!dockerfile.contains("-r requirements.txt"));
    }

    #[test]
    fn test_no_system_packages() {
        let d = ImageDescriptor {
            system_packages: vec![],
            prune_packages: vec![],
            ..ImageDescriptor::default()
        };
        let dockerfile = render_dockerfile(&d);
        assert!(!dockerfile.contains("apt-get"));
        assert!(dockerfile.contains("RUN pip install --no-cache-dir -r requirements.txt"));
    }
}
