const EXTRA_ALLOWED: &[char] = &['-', '_', '~', ',', ';', '[', ']', '(', ')', '.'];

pub const SAVE_EXTENSION: &str = "mp4";

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || EXTRA_ALLOWED.contains(&c)
}

/// Replaces every character outside `[A-Za-z0-9-_~,;[]().]` with `_`, one for one.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if is_allowed(c) { c } else { '_' })
        .collect()
}

pub fn save_name(record_name: &str) -> String {
    format!("{}.{}", sanitize_filename(record_name), SAVE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_mixed_title() {
        assert_eq!(
            sanitize_filename("My Recording: Q1/2024!.mp4"),
            "My_Recording__Q1_2024_.mp4"
        );
    }

    #[test]
    fn sanitize_keeps_allowed_punctuation() {
        let input = "a-b_c~d,e;f[g]h(i)j.k";
        assert_eq!(sanitize_filename(input), input);
    }

    #[test]
    fn sanitize_is_idempotent() {
        for input in ["Team Sync", "Weekly | Review * 3?", "ünïcödé 日本", "", "..\\..//x"] {
            let once = sanitize_filename(input);
            assert_eq!(sanitize_filename(&once), once);
        }
    }

    #[test]
    fn sanitize_replaces_one_for_one() {
        let input = "日本 語";
        assert_eq!(sanitize_filename(input), "___");
        assert_eq!(sanitize_filename(input).chars().count(), input.chars().count());
    }

    #[test]
    fn sanitize_windows_forbidden_paths() {
        let chars = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
        for c in chars {
            let input = format!("test{}file", c);
            assert_eq!(sanitize_filename(&input), "test_file", "char '{}' should be replaced", c);
        }
    }

    #[test]
    fn save_name_appends_mp4() {
        assert_eq!(save_name("Team Sync"), "Team_Sync.mp4");
        assert_eq!(save_name(""), ".mp4");
    }
}
