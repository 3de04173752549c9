use serde_json::json;
use stancedb::Store;
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> Store {
    Store::open(dir.path().join("db.json")).unwrap()
}

fn insert_id(store: &Store, query: &str, params: &[serde_json::Value]) -> String {
    let rows = store.query(query, params).unwrap();
    rows[0]["id"].as_str().unwrap().to_string()
}

fn link(store: &Store, stance_point: &str, reference: &str) {
    store
        .query(
            "INSERT INTO stance_point_references (stance_point_id, reference_id) VALUES ($1, $2)",
            &[json!(stance_point), json!(reference)],
        )
        .unwrap();
}

const JOINED_SELECT: &str = "SELECT sp.* FROM stance_points \
     LEFT JOIN stance_point_references spr ON sp.id = spr.stance_point_id \
     LEFT JOIN references r ON spr.reference_id = r.id \
     WHERE session_id = $1";

#[test]
fn stance_points_gain_their_linked_sources() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let sp1 = insert_id(
        &store,
        "INSERT INTO stance_points (session_id, topic) VALUES ($1, $2)",
        &[json!("s1"), json!("coal")],
    );
    let sp2 = insert_id(
        &store,
        "INSERT INTO stance_points (session_id, topic) VALUES ($1, $2)",
        &[json!("s1"), json!("wind")],
    );
    let r1 = insert_id(
        &store,
        "INSERT INTO references (url, title, source_type) VALUES ($1, $2, $3)",
        &[json!("https://a.example"), json!("A"), json!("news")],
    );
    let r2 = insert_id(
        &store,
        "INSERT INTO references (url, title, source_type) VALUES ($1, $2, $3)",
        &[json!("https://b.example"), json!("B"), json!("speech")],
    );
    link(&store, &sp1, &r1);
    link(&store, &sp1, &r2);
    link(&store, &sp2, &r2);

    let rows = store.query(JOINED_SELECT, &[json!("s1")]).unwrap();
    assert_eq!(rows.len(), 2);

    let sources1 = rows[0]["sources"].as_array().unwrap();
    assert_eq!(sources1.len(), 2);
    assert_eq!(sources1[0]["id"], json!(r1));
    assert_eq!(sources1[1]["id"], json!(r2));
    assert_eq!(sources1[0]["url"], json!("https://a.example"));

    let sources2 = rows[1]["sources"].as_array().unwrap();
    assert_eq!(sources2.len(), 1);
    assert_eq!(sources2[0]["id"], json!(r2));
}

#[test]
fn sources_projects_a_fixed_field_subset() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let sp = insert_id(
        &store,
        "INSERT INTO stance_points (session_id) VALUES ($1)",
        &[json!("s1")],
    );
    let r = insert_id(
        &store,
        "INSERT INTO references (url, title, excerpt, published_date, source_type, raw_html) \
         VALUES ($1, $2, $3, $4, $5, $6)",
        &[
            json!("https://a.example"),
            json!("A"),
            json!("snippet"),
            json!("2024-05-01"),
            json!("news"),
            json!("<html>big blob</html>"),
        ],
    );
    link(&store, &sp, &r);

    let rows = store.query(JOINED_SELECT, &[json!("s1")]).unwrap();
    let source = &rows[0]["sources"][0];
    assert_eq!(source["excerpt"], json!("snippet"));
    assert_eq!(source["published_date"], json!("2024-05-01"));
    // Non-projected fields stay behind.
    assert!(source.get("raw_html").is_none());
    assert!(source.get("created_at").is_none());
}

#[test]
fn stance_points_without_links_get_an_empty_sources_array() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    insert_id(
        &store,
        "INSERT INTO stance_points (session_id) VALUES ($1)",
        &[json!("s1")],
    );

    let rows = store.query(JOINED_SELECT, &[json!("s1")]).unwrap();
    assert_eq!(rows[0]["sources"], json!([]));
}

#[test]
fn select_without_join_clause_attaches_nothing() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let sp = insert_id(
        &store,
        "INSERT INTO stance_points (session_id) VALUES ($1)",
        &[json!("s1")],
    );
    let r = insert_id(
        &store,
        "INSERT INTO references (url) VALUES ($1)",
        &[json!("https://a.example")],
    );
    link(&store, &sp, &r);

    let rows = store
        .query(
            "SELECT * FROM stance_points WHERE session_id = $1",
            &[json!("s1")],
        )
        .unwrap();
    assert!(rows[0].get("sources").is_none());
}

#[test]
fn joins_on_other_tables_parse_but_have_no_effect() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store
        .query(
            "INSERT INTO tracking_sessions (candidate) VALUES ($1)",
            &[json!("Jane Doe")],
        )
        .unwrap();

    let rows = store
        .query(
            "SELECT * FROM tracking_sessions \
             LEFT JOIN stance_points sp ON tracking_sessions.id = sp.session_id",
            &[],
        )
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].get("sources").is_none());
    assert!(rows[0].get("stance_points").is_none());
}
