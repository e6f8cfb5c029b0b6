use scraper::Html;

use webexdl_core::page::MemoryPage;

pub const PLAYER_SHELL_HTML: &str = r#"<!DOCTYPE html>
<html><body>
  <div class="recordingHeader">
    <span class="recordingTitle"></span>
  </div>
</body></html>"#;

pub fn class_lists(html: &str) -> Vec<Vec<String>> {
    let document = Html::parse_document(html);
    document
        .tree
        .values()
        .filter_map(|node| node.as_element())
        .map(|el| el.classes().map(|c| c.to_string()).collect::<Vec<_>>())
        .filter(|classes| !classes.is_empty())
        .collect()
}

pub fn render_into(page: &mut MemoryPage, html: &str) {
    for classes in class_lists(html) {
        let refs: Vec<&str> = classes.iter().map(String::as_str).collect();
        page.add_element(&refs);
    }
}
