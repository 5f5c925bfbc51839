pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_vaults.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_vaults.sql")),
				"tables/002_vault_files.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_vault_files.sql")),
				"tables/003_vault_notes.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_vault_notes.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn includes_are_expanded_in_dependency_order() {
		let sql = render_schema();
		let vaults = sql.find("CREATE TABLE IF NOT EXISTS vaults").expect("vaults table");
		let files = sql.find("CREATE TABLE IF NOT EXISTS vault_files").expect("files table");
		let notes = sql.find("CREATE TABLE IF NOT EXISTS vault_notes").expect("notes table");

		assert!(vaults < files && files < notes);
		assert!(!sql.contains("\\ir "));
	}

	#[test]
	fn unknown_includes_are_kept_verbatim() {
		let sql = expand_includes("\\ir tables/999_unknown.sql\nSELECT 1");

		assert_eq!(sql, "\\ir tables/999_unknown.sql\nSELECT 1\n");
	}
}
