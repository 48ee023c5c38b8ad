#![forbid(unsafe_code)]

use std::sync::Once;
use std::time::Duration;

use querysmith::query::field::{
    Comparison, Field, IdField, Nillable, Numeric, Ordered, SliceField, StringField, TimeField,
};
use querysmith::query::{
    all, any, ChangesQuery, Filter, Key, Query, Search, SearchAll, Since, Sort, Value,
};
use querysmith::CompilerConfig;
use time::macros::datetime;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("querysmith=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .try_init();
    });
}

struct Movie;
struct Acted;

struct MovieFields {
    title: StringField<Movie>,
    year: Numeric<Movie, i64>,
    rating: Nillable<Numeric<Movie, f64>>,
    released: TimeField<Movie>,
    tags: SliceField<Movie, StringField<Movie>>,
    id: IdField<Movie>,
}

fn movie() -> MovieFields {
    let root = Key::<Movie>::root();
    MovieFields {
        title: StringField::new(root.field("title")),
        year: Numeric::new(root.field("year")),
        rating: Nillable::new(Numeric::new(root.field("rating"))),
        released: TimeField::new(root.field("released")),
        tags: SliceField::new(root.field("tags")),
        id: IdField::new(root.field("id"), "movie"),
    }
}

#[test]
fn matrix_end_to_end() {
    init_tracing();
    let m = movie();
    let query = Query::new("movie")
        .offset(5)
        .filter(all([m.title.equal("Matrix"), m.year.greater(1990i64)]))
        .limit(10);
    let rendered = query.build();
    assert_eq!(
        rendered.statement,
        "SELECT * FROM movie WHERE ((title = $0 AND year > $1)) LIMIT 10 START 5"
    );
    assert_eq!(
        rendered.variables_json().unwrap(),
        r#"{"0":{"t":"String","v":"Matrix"},"1":{"t":"Int","v":1990}}"#
    );
    assert_eq!(
        query.describe(),
        "SELECT * FROM movie WHERE ((title = 'Matrix' AND year > 1990)) LIMIT 10 START 5"
    );
}

#[test]
fn nested_combinators_and_nil_checks() {
    init_tracing();
    let m = movie();
    let rendered = Query::new("movie")
        .filter(any([
            m.rating.nil(true),
            all([m.rating.value().less(5.0), m.tags.contains("noir").not()]),
        ]))
        .filter(m.released.after(datetime!(2000-01-01 0:00 UTC)))
        .build();
    assert_eq!(
        rendered.statement,
        "SELECT * FROM movie WHERE (((rating == NONE OR rating == NULL) OR \
         (rating < $0 AND !(tags CONTAINS $1))) AND released > $2)"
    );
    assert_eq!(rendered.variables.len(), 3);
    assert!(matches!(rendered.variables.get("2"), Some(Value::DateTime(_))));
}

#[test]
fn empty_filters_leave_no_where_clause() {
    init_tracing();
    let rendered = Query::<Movie>::new("movie")
        .filter(all(Vec::new()))
        .filter(any([all(Vec::new())]))
        .build();
    assert_eq!(rendered.statement, "SELECT * FROM movie");
}

#[test]
fn traversal_filters_bind_in_render_order() {
    init_tracing();
    let m = movie();
    let root = Key::<Movie>::root();
    let role = StringField::<Acted>::new(Key::root().field("role"));
    let acted = root.in_("acted_in", [role.equal("lead")]);
    let star = acted.field("in");
    let name = StringField::new(star.field("name"));
    let born = Numeric::<Movie, i64>::new(star.field("born"));
    let rendered = Query::new("movie")
        .filter(m.year.less(1970i64))
        .filter(name.fuzzy_match("Hepburn"))
        .order(born.asc())
        .build();
    assert_eq!(
        rendered.statement,
        "SELECT *, <-acted_in[WHERE (role = $3)].in.born AS __sort_0 FROM movie \
         WHERE (year < $0 AND <-acted_in[WHERE (role = $1)].in.name ~ $2) ORDER BY __sort_0 ASC"
    );
    assert_eq!(rendered.variables.get("1"), Some(&Value::from("lead")));
}

#[test]
fn sorted_search_with_projections() {
    init_tracing();
    let m = movie();
    let rendered = Query::new("movie")
        .search(Search::new(m.title.key(), "space odyssey").reference(1).highlight("<em>", "</em>"))
        .search_all(SearchAll::new([m.title.matches("kubrick").or()]))
        .order(Sort::score([1, 2]))
        .order(m.year.desc())
        .build();
    assert_eq!(
        rendered.statement,
        "SELECT *, search::score(1) + search::score(2) AS __sort_score, year AS __sort_1, \
         search::highlight($0, $1, 1) AS __highlight_1 \
         FROM movie WHERE ((title @1@ 'space odyssey' OR title @2,OR@ 'kubrick')) \
         ORDER BY __sort_score DESC, __sort_1 DESC"
    );
}

#[test]
fn describe_keeps_dollar_signs_in_search_terms() {
    init_tracing();
    let m = movie();
    let query = Query::new("movie")
        .filter(m.title.equal("x"))
        .search(m.title.matches("cost $0"));
    assert_eq!(
        query.describe(),
        "SELECT * FROM movie WHERE (title = 'x' AND title @0@ 'cost $0')"
    );
}

#[test]
fn every_mode_from_one_builder() {
    init_tracing();
    let m = movie();
    let query = Query::new("movie")
        .filter(m.id.in_keys(["alien", "aliens"]))
        .order(m.title.asc().collate())
        .limit(2)
        .timeout(Duration::from_millis(250))
        .fetch(&Key::<Movie>::root().field("director"));
    assert_eq!(
        query.build_as_all_ids().statement,
        "SELECT id, title AS __sort_0 FROM movie WHERE (id IN $0) ORDER BY __sort_0 COLLATE ASC \
         LIMIT 2 FETCH director TIMEOUT 250ms"
    );
    assert_eq!(
        query.build_as_count().statement,
        "SELECT count() AS count FROM movie WHERE (id IN $0) GROUP ALL TIMEOUT 250ms"
    );
    assert_eq!(
        query.build_as_live().statement,
        "LIVE SELECT * FROM movie WHERE (id IN $0) FETCH director"
    );
    assert_eq!(
        query.build_as_first().statement,
        "SELECT *, title AS __sort_0 FROM movie WHERE (id IN $0) ORDER BY __sort_0 COLLATE ASC \
         LIMIT 1 FETCH director TIMEOUT 250ms"
    );
    let ids = query.build().variables;
    assert_eq!(
        ids.get("0").map(Value::to_literal).as_deref(),
        Some("[type::thing('movie', 'alien'), type::thing('movie', 'aliens')]")
    );
}

#[test]
fn strict_config_caps_results() {
    init_tracing();
    let rendered = Query::<Movie>::new("movie")
        .limit(50_000)
        .with_config(&CompilerConfig::strict())
        .build();
    assert_eq!(
        rendered.statement,
        "SELECT * FROM movie LIMIT 1000 TIMEOUT 5s"
    );
}

#[test]
fn changes_feed_uses_literal_cursor() {
    init_tracing();
    let rendered = ChangesQuery::new("movie")
        .since(Since::Timestamp(datetime!(2023-11-05 08:30:15 UTC)))
        .build()
        .unwrap();
    assert_eq!(
        rendered.statement,
        "SHOW CHANGES FOR TABLE movie SINCE d'2023-11-05T08:30:15Z'"
    );
    assert!(rendered.variables.is_empty());
}

#[test]
fn trees_are_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Key<Movie>>();
    assert_send_sync::<Filter<Movie>>();
    assert_send_sync::<Sort<Movie>>();
    assert_send_sync::<Search<Movie>>();
    assert_send_sync::<Query<Movie>>();

    init_tracing();
    let m = movie();
    let query = Query::new("movie")
        .filter(all([m.title.equal("Matrix"), m.year.greater(1990i64)]))
        .order(m.year.desc());
    let expected = query.build();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| query.build())).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
