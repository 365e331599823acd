//! Static info panel template

use std::path::Path;

use tracing::{debug, warn};

use crate::error::AnifetchResult;
use crate::ports::SystemInfoPort;

/// Columns left of the animation area
pub const TEMPLATE_PAD_LEFT: usize = 4;
/// Columns between the animation area and the info text
pub const TEMPLATE_GAP: usize = 2;
/// Terminal width used when `COLUMNS` is unset or invalid
pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// Terminal width from `COLUMNS`
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&w| w > 0)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}

/// Lay out the info text to the right of a blank animation area.
///
/// Produces `max(height, info_lines.len())` lines, each exactly
/// `terminal_width` characters wide.
pub fn build_template(
    info_lines: &[String],
    width: usize,
    height: usize,
    terminal_width: usize,
) -> Vec<String> {
    let info_start = TEMPLATE_PAD_LEFT + width + TEMPLATE_GAP;
    let info_width = terminal_width.saturating_sub(info_start);
    let rows = height.max(info_lines.len());

    (0..rows)
        .map(|row| {
            let info = info_lines.get(row).map(String::as_str).unwrap_or("");
            let mut line = " ".repeat(info_start);
            line.extend(info.chars().take(info_width));
            let used = line.chars().count();
            if used < terminal_width {
                line.push_str(&" ".repeat(terminal_width - used));
            }
            line.chars().take(terminal_width).collect()
        })
        .collect()
}

/// Collect the info panel lines, falling back to `height` blank lines
pub fn info_lines_or_blank(info: &dyn SystemInfoPort, height: usize) -> Vec<String> {
    match info.info_lines() {
        Ok(lines) if !lines.is_empty() => lines,
        Ok(_) => {
            warn!("System info tool produced no output; static info will be blank");
            vec![" ".to_string(); height]
        }
        Err(e) => {
            warn!("Could not collect system info: {}", e);
            vec![" ".to_string(); height]
        }
    }
}

/// Write the template, one line per row
pub fn write_template(path: &Path, lines: &[String]) -> AnifetchResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(path, content)?;
    debug!("Static template written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnifetchError;

    struct FixedInfo(Option<Vec<String>>);

    impl SystemInfoPort for FixedInfo {
        fn info_lines(&self) -> AnifetchResult<Vec<String>> {
            self.0
                .clone()
                .ok_or_else(|| AnifetchError::tool("fastfetch", "not found"))
        }
    }

    #[test]
    fn test_layout_pads_and_crops() {
        let info = vec!["OS: Linux".to_string(), "x".repeat(100)];
        let lines = build_template(&info, 10, 3, 30);

        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.chars().count() == 30));
        assert_eq!(&lines[0][16..25], "OS: Linux");
        assert!(lines[0][..16].trim().is_empty());
        assert_eq!(lines[1][16..], "x".repeat(14));
        assert!(lines[2].trim().is_empty());
    }

    #[test]
    fn test_more_info_than_animation_rows() {
        let info: Vec<String> = (0..5).map(|i| format!("line {}", i)).collect();
        assert_eq!(build_template(&info, 4, 2, 80).len(), 5);
    }

    #[test]
    fn test_narrow_terminal_has_no_info_area() {
        let info = vec!["OS: Linux".to_string()];
        let lines = build_template(&info, 40, 1, 20);
        assert_eq!(lines[0], " ".repeat(20));
    }

    #[test]
    fn test_fallback_to_blank_lines() {
        assert_eq!(info_lines_or_blank(&FixedInfo(None), 3).len(), 3);
        assert_eq!(info_lines_or_blank(&FixedInfo(Some(vec![])), 2).len(), 2);
        assert_eq!(
            info_lines_or_blank(&FixedInfo(Some(vec!["a".to_string()])), 9),
            vec!["a".to_string()]
        );
    }
}
