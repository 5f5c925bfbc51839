use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static UNSAFE_CHARS: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("Filename pattern must compile."));

/// Reduces an uploaded file name to a conservative ASCII form safe to use as a single path
/// component. Returns `None` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
	let ascii = name.nfkd().filter(char::is_ascii).collect::<String>();
	let flattened = ascii.replace(['/', '\\'], " ");
	let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
	let cleaned = UNSAFE_CHARS.replace_all(&joined, "");
	let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

	if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Name of the blob that stores `original` for the vault opened with `pin`.
pub fn stored_filename(pin: &str, original: &str) -> Option<String> {
	sanitize_filename(&format!("{pin}_{original}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_simple_names() {
		assert_eq!(stored_filename("1234", "a.txt").as_deref(), Some("1234_a.txt"));
		assert_eq!(sanitize_filename("report-2024.v2.pdf").as_deref(), Some("report-2024.v2.pdf"));
	}

	#[test]
	fn collapses_whitespace_and_path_separators() {
		assert_eq!(sanitize_filename("my cool  file.txt").as_deref(), Some("my_cool_file.txt"));
		assert_eq!(
			sanitize_filename("../../etc/passwd").as_deref(),
			Some("etc_passwd"),
			"Traversal components must not survive."
		);
		assert_eq!(sanitize_filename("C:\\Users\\me\\a.txt").as_deref(), Some("C_Users_me_a.txt"));
	}

	#[test]
	fn folds_accents_and_drops_other_unicode() {
		assert_eq!(sanitize_filename("résumé.pdf").as_deref(), Some("resume.pdf"));
		assert_eq!(sanitize_filename("日本.txt").as_deref(), Some("txt"));
	}

	#[test]
	fn strips_leading_and_trailing_dots_and_underscores() {
		assert_eq!(sanitize_filename("..hidden_").as_deref(), Some("hidden"));
		assert_eq!(sanitize_filename("...").as_deref(), None);
		assert_eq!(sanitize_filename("日本").as_deref(), None);
		assert_eq!(sanitize_filename("").as_deref(), None);
	}

	#[test]
	fn strips_shell_metacharacters() {
		assert_eq!(sanitize_filename("a;rm -rf $HOME.txt").as_deref(), Some("arm_-rf_HOME.txt"));
	}
}
