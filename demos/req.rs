use anyhow::Result;
use serde_json::json;

fn main() -> Result<()> {
    let input = r#"HTTP POST | URL https://api.github.com/user/emails | HEADERS {"Accept": "application/vnd.github+json", "Authorization": "Bearer {{ token }}"} | QUERY {"per_page": 5} | BODY {"emails": ["octocat@github.com", "mona@github.com"]}"#;
    let context = json!({ "token": "abcd1234" });
    let parsed = reqline::ParsedRequest::load(input, context)?;
    println!("{parsed:#?}");
    Ok(())
}
