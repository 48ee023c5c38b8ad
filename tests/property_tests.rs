use proptest::prelude::*;
use querysmith::query::field::{Comparison, Nillable, Numeric, Ordered, StringField};
use querysmith::query::search::{build_search_or, SearchGroup};
use querysmith::query::{all, any as any_of, Context, Filter, Key, Query, Search, Value};

struct Movie;

fn arb_field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,8}"
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        any::<bool>().prop_map(Value::Bool),
        "[ -~]{0,12}".prop_map(Value::String),
        Just(Value::Null),
    ]
}

/// A filter that either renders to a comparison or to nothing at all.
fn arb_leaf() -> impl Strategy<Value = (Filter<Movie>, bool)> {
    prop_oneof![
        arb_field_name().prop_map(|name| {
            let year = Numeric::<Movie, i64>::new(Key::root().field(name));
            (year.greater(0i64), false)
        }),
        Just((all(Vec::new()), true)),
        Just((any_of(vec![all(Vec::new())]), true)),
    ]
}

#[derive(Clone, Copy, Debug)]
enum Step {
    Limit(u64),
    Offset(u64),
    Timeout,
    Parallel,
    Order,
    Random,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (1u64..1000).prop_map(Step::Limit),
        (0u64..1000).prop_map(Step::Offset),
        Just(Step::Timeout),
        Just(Step::Parallel),
        Just(Step::Order),
        Just(Step::Random),
    ]
}

fn apply(query: Query<Movie>, step: Step) -> Query<Movie> {
    let year = Numeric::<Movie, i64>::new(Key::root().field("year"));
    match step {
        Step::Limit(n) => query.limit(n),
        Step::Offset(n) => query.offset(n),
        Step::Timeout => query.timeout(std::time::Duration::from_secs(1)),
        Step::Parallel => query.parallel(),
        Step::Order => query.order(year.desc()),
        Step::Random => query.order_random(),
    }
}

proptest! {
    #[test]
    fn prop_groups_are_empty_iff_all_members_are(leaves in prop::collection::vec(arb_leaf(), 0..6)) {
        let all_empty = leaves.iter().all(|(_, empty)| *empty);
        let filters: Vec<Filter<Movie>> = leaves.into_iter().map(|(f, _)| f).collect();
        for group in [all(filters.clone()), any_of(filters)] {
            let mut ctx = Context::new();
            let rendered = group.render(&mut ctx);
            prop_assert_eq!(rendered.is_empty(), all_empty);
            if !all_empty {
                prop_assert!(rendered.starts_with('('));
                prop_assert!(rendered.ends_with(')'));
                prop_assert!(!rendered.starts_with("(."));
                prop_assert!(!rendered.contains(" AND  ") && !rendered.contains(" OR  "));
            }
        }
    }

    #[test]
    fn prop_placeholders_follow_call_order(values in prop::collection::vec(arb_value(), 0..40)) {
        let mut ctx = Context::new();
        for (idx, value) in values.iter().enumerate() {
            prop_assert_eq!(ctx.as_var(value.clone()), format!("${idx}"));
        }
        prop_assert_eq!(ctx.vars().values(), values.as_slice());
    }

    #[test]
    fn prop_key_filter_strips_leading_dot(names in prop::collection::vec(arb_field_name(), 1..5)) {
        let mut key = Key::<Movie>::root();
        for name in &names {
            key = key.field(name.as_str());
        }
        let mut ctx = Context::new();
        let raw = key.render(&mut ctx);
        let filtered = Filter::from(key).render(&mut ctx);
        prop_assert_eq!(raw.strip_prefix('.').unwrap_or(&raw), filtered.as_str());
        prop_assert_eq!(filtered, names.join("."));
    }

    #[test]
    fn prop_nil_checks_are_complements(name in arb_field_name()) {
        let rating = Nillable::new(StringField::<Movie>::new(Key::root().field(name.as_str())));
        let mut ctx = Context::new();
        let is_nil = rating.nil(true).render(&mut ctx);
        let not_nil = rating.nil(false).render(&mut ctx);
        // De Morgan: swap the connective and negate each comparison.
        let negated = is_nil.replace(" == ", " != ").replace(" OR ", " AND ");
        prop_assert_eq!(negated, not_nil);
        prop_assert!(ctx.vars().is_empty());
    }

    #[test]
    fn prop_clause_order_ignores_call_order(steps in prop::collection::vec(arb_step(), 0..8)) {
        let title = StringField::<Movie>::new(Key::root().field("title"));
        let mut query = Query::new("movie").filter(title.equal("Matrix"));
        for step in &steps {
            query = apply(query, *step);
        }
        let statement = query.build().statement;
        let positions: Vec<usize> = [" WHERE ", " ORDER BY ", " LIMIT ", " START ", " TIMEOUT ", " PARALLEL"]
            .iter()
            .filter_map(|clause| statement.find(clause))
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", statement);
    }

    #[test]
    fn prop_live_never_renders_unsupported_clauses(steps in prop::collection::vec(arb_step(), 0..8)) {
        let mut query = Query::<Movie>::new("movie");
        for step in &steps {
            query = apply(query, *step);
        }
        for rendered in [query.build_as_live(), query.build_as_live_diff()] {
            for clause in ["GROUP", "ORDER BY", "LIMIT", "START", "TIMEOUT", "PARALLEL"] {
                prop_assert!(!rendered.statement.contains(clause), "{}", rendered.statement);
            }
        }
    }

    #[test]
    fn prop_search_refs_are_sequential(count in 1usize..8, explicit in prop::option::of((0usize..8, 0u32..50))) {
        let title = Key::<Movie>::root().field("title");
        let groups: Vec<SearchGroup<Movie>> = (0..count)
            .map(|idx| {
                let search = Search::new(&title, format!("term{idx}"));
                match explicit {
                    Some((at, reference)) if at == idx => SearchGroup::One(search.reference(reference)),
                    _ => SearchGroup::One(search),
                }
            })
            .collect();
        let mut ctx = Context::new();
        let (_, clauses) = build_search_or(&groups, &mut ctx);
        let mut expected = 0u32;
        for (idx, clause) in clauses.iter().enumerate() {
            if let Some((at, reference)) = explicit {
                if at == idx {
                    expected = reference;
                }
            }
            prop_assert_eq!(clause.reference, expected);
            expected = clause.reference.saturating_add(1);
        }
    }
}
