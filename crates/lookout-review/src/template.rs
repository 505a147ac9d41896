use lookout_core::{Error, Result};
use lookout_scm::PullRequest;

/// Render a prompt template against a pull request.
///
/// Placeholders are written `{{Field}}` (inner whitespace and a leading
/// `.` are tolerated) and resolve against the PR's fields: `Number`,
/// `Title`, `Body`, `Author`, `Diff`, `ID`, `URL`, `HTMLURL`, `DiffURL`,
/// `CreatedAt`, `UpdatedAt`.
///
/// # Errors
///
/// Returns [`Error::Template`] for an unknown field or an unclosed
/// placeholder, so template problems are distinguishable from I/O
/// failures.
///
/// # Examples
///
/// ```
/// use lookout_review::template::render;
/// use lookout_scm::PullRequest;
///
/// let pr = PullRequest { number: 42, ..PullRequest::default() };
/// assert_eq!(render("PR #{{Number}}", &pr).unwrap(), "PR #42");
/// ```
pub fn render(template: &str, pr: &PullRequest) -> Result<String> {
    let mut out = String::with_capacity(template.len() + pr.raw_diff.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return Err(Error::Template(
                "unclosed '{{' placeholder in prompt template".into(),
            ));
        };

        let key = after[..end].trim();
        let key = key.strip_prefix('.').unwrap_or(key);
        out.push_str(&field_value(pr, key)?);

        rest = &after[end + 2..];
    }
    out.push_str(rest);

    Ok(out)
}

fn field_value(pr: &PullRequest, key: &str) -> Result<String> {
    Ok(match key {
        "ID" => pr.id.to_string(),
        "Number" => pr.number.to_string(),
        "Title" => pr.title.clone(),
        "Body" => pr.body.clone(),
        "Author" => pr.author.clone(),
        "URL" => pr.url.clone(),
        "HTMLURL" => pr.html_url.clone(),
        "DiffURL" => pr.diff_url.clone(),
        "Diff" | "RawDiff" => pr.raw_diff.clone(),
        "CreatedAt" => pr.created_at.to_rfc3339(),
        "UpdatedAt" => pr.updated_at.to_rfc3339(),
        other => {
            return Err(Error::Template(format!(
                "unknown field '{other}' in prompt template"
            )))
        }
    })
}
