use docfill_derive::api_model;

#[api_model]
struct LimitsResponse {
    max_documents: usize,
    archive_name: String,
}

#[api_model]
#[serde(rename_all = "snake_case")]
struct SnakeCase {
    base_name: String,
}

fn main() {
    let limits = LimitsResponse { max_documents: 25, archive_name: "out.zip".to_owned() };
    let json = serde_json::to_string(&limits).unwrap();
    assert_eq!(json, r#"{"maxDocuments":25,"archiveName":"out.zip"}"#);

    let strict = serde_json::from_str::<LimitsResponse>(r#"{"maxDocuments":1,"archiveName":"a","extra":0}"#);
    assert!(strict.is_err());

    let snake: SnakeCase = serde_json::from_str(r#"{"base_name":"Letter"}"#).unwrap();
    assert_eq!(format!("{snake:?}"), r#"SnakeCase { base_name: "Letter" }"#);
}
