//! Minimal HTML pages. Every dynamic value goes through [`escape`].

use std::fmt::Write;

use pinvault_service::ViewResponse;

pub fn escape(raw: &str) -> String {
	let mut escaped = String::with_capacity(raw.len());

	for c in raw.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#x27;"),
			_ => escaped.push(c),
		}
	}

	escaped
}

pub fn login(flashes: &[String]) -> String {
	layout(
		"Open vault",
		flashes,
		r#"<form method="post" action="/login">
<label>PIN <input type="password" name="vault_password" autofocus></label>
<button type="submit">Open</button>
</form>
<p><a href="/about">About</a></p>"#,
	)
}

pub fn home(pin: &str, flashes: &[String]) -> String {
	let body = format!(
		r#"<p>Vault <strong>{}</strong> · <a href="/view">View vault</a> · <a href="/logout">Log out</a></p>
<form method="post" action="/upload" enctype="multipart/form-data">
<p><input type="file" name="file"></p>
<p><textarea name="code" rows="12" cols="80" placeholder="Paste code or notes"></textarea></p>
<button type="submit">Save to vault</button>
</form>"#,
		escape(pin)
	);

	layout("PinVault", flashes, &body)
}

pub fn view(view: &ViewResponse, flashes: &[String]) -> String {
	let mut body = format!(
		"<p>Vault <strong>{}</strong> · <a href=\"/\">Upload</a> · <a href=\"/logout\">Log out</a></p>\n<h2>Files</h2>\n",
		escape(&view.pin)
	);

	if view.files.is_empty() {
		body.push_str("<p>No files.</p>\n");
	} else {
		body.push_str("<ul>\n");

		for filename in &view.files {
			let name = escape(filename);
			let _ = writeln!(
				body,
				"<li>{name} <a href=\"/download/{name}\">Download</a> <a href=\"/delete_file/{name}\">Delete</a></li>"
			);
		}

		body.push_str("</ul>\n");
	}

	let _ = write!(
		body,
		r#"<h2>Notes</h2>
<form method="post" action="/update_note">
<p><textarea name="updated_code" rows="16" cols="80">{}</textarea></p>
<button type="submit">Save notes</button>
</form>
<form method="post" action="/delete_note">
<button type="submit">Delete notes</button>
</form>"#,
		escape(&view.notes)
	);

	layout("Vault contents", flashes, &body)
}

pub fn about() -> String {
	layout(
		"About",
		&[],
		r#"<p>PinVault keeps files and notes behind a PIN. Anything stored expires after thirty days.</p>
<p><a href="/login">Open a vault</a></p>"#,
	)
}

fn layout(title: &str, flashes: &[String], body: &str) -> String {
	let mut page = format!(
		"<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{0}</title></head>\n<body>\n<h1>{0}</h1>\n",
		escape(title)
	);

	if !flashes.is_empty() {
		page.push_str("<ul class=\"flashes\">\n");

		for message in flashes {
			let _ = writeln!(page, "<li>{}</li>", escape(message));
		}

		page.push_str("</ul>\n");
	}

	page.push_str(body);
	page.push_str("\n</body>\n</html>\n");

	page
}
