use axum::response::Html;

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>docfill</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 36rem; margin: 3rem auto; padding: 0 1rem; }
  label { display: block; margin-top: 1rem; font-weight: 600; }
  input[type=text], input[type=number] { width: 100%; padding: .4rem; }
  button { margin-top: 1.5rem; padding: .6rem 1.2rem; }
  small { color: #555; }
</style>
</head>
<body>
<h1>Generate documents</h1>
<form action="/api/v1/batch" method="post" enctype="multipart/form-data">
  <label for="template">Word template (.docx)</label>
  <input id="template" name="template" type="file" accept=".docx" required>
  <label for="replacements">Replacements sheet (.csv)</label>
  <input id="replacements" name="replacements" type="file" accept=".csv" required>
  <small>Header cells are the placeholders to find; each row produces one document.</small>
  <label for="base_name">File name prefix</label>
  <input id="base_name" name="base_name" type="text" placeholder="document">
  <label for="max_documents">Maximum documents</label>
  <input id="max_documents" name="max_documents" type="number" min="1">
  <button type="submit">Generate zip</button>
</form>
</body>
</html>
"#;

pub(super) async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
