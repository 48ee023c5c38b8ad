//! Fluent statement builder.
//!
//! A [`Query`] collects a target table, filters, searches, sorts, pagination
//! and execution flags. Nothing is rendered until a terminal `build*` call:
//! each one clones the builder, switches the clone into its render mode and
//! assembles the statement, so one configured builder can produce several
//! statements without any of them affecting the others.

use std::fmt;
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::{CompilerConfig, DEFAULT_SORT_ALIAS_PREFIX};
use crate::query::changes::{ChangesQuery, Since};
use crate::query::context::{Context, Rendered};
use crate::query::filter::{join_group, Filter};
use crate::query::key::{Key, KeyPath};
use crate::query::operator::Logic;
use crate::query::search::{build_search_or, Search, SearchAll, SearchClause, SearchGroup};
use crate::query::sort::{Sort, SortSpec};
use crate::query::value::format_duration;

/// Tracing target for rendered statements.
pub const LOG_TARGET: &str = "querysmith::query";

/// Render mode selected by the terminal `build*` call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SelectMode {
    /// Full records.
    #[default]
    All,
    /// Record ids only.
    Ids,
    /// Number of matching records.
    Count,
    /// Live subscription emitting full records.
    Live,
    /// Live subscription emitting JSON patches.
    LiveDiff,
}

impl SelectMode {
    /// Returns `true` for subscription modes.
    pub fn is_live(self) -> bool {
        matches!(self, SelectMode::Live | SelectMode::LiveDiff)
    }
}

impl fmt::Display for SelectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectMode::All => "all",
            SelectMode::Ids => "ids",
            SelectMode::Count => "count",
            SelectMode::Live => "live",
            SelectMode::LiveDiff => "live_diff",
        };
        f.write_str(name)
    }
}

/// Selection over records of type `M` stored in one table.
pub struct Query<M> {
    target: String,
    filters: Vec<Filter<M>>,
    searches: Vec<SearchGroup<M>>,
    sorts: Vec<Sort<M>>,
    random: bool,
    fetch: Vec<KeyPath>,
    offset: Option<u64>,
    limit: Option<u64>,
    timeout: Option<Duration>,
    parallel: bool,
    mode: SelectMode,
    sort_alias_prefix: String,
    max_limit: Option<u64>,
}

impl<M> Clone for Query<M> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            filters: self.filters.clone(),
            searches: self.searches.clone(),
            sorts: self.sorts.clone(),
            random: self.random,
            fetch: self.fetch.clone(),
            offset: self.offset,
            limit: self.limit,
            timeout: self.timeout,
            parallel: self.parallel,
            mode: self.mode,
            sort_alias_prefix: self.sort_alias_prefix.clone(),
            max_limit: self.max_limit,
        }
    }
}

impl<M> fmt::Debug for Query<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("target", &self.target)
            .field("filters", &self.filters)
            .field("searches", &self.searches)
            .field("sorts", &self.sorts)
            .field("random", &self.random)
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .field("timeout", &self.timeout)
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}

impl<M> Query<M> {
    /// Creates a builder selecting from `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            filters: Vec::new(),
            searches: Vec::new(),
            sorts: Vec::new(),
            random: false,
            fetch: Vec::new(),
            offset: None,
            limit: None,
            timeout: None,
            parallel: false,
            mode: SelectMode::All,
            sort_alias_prefix: DEFAULT_SORT_ALIAS_PREFIX.to_owned(),
            max_limit: None,
        }
    }

    /// Table the statement selects from.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Applies render defaults from `config`.
    pub fn with_config(mut self, config: &CompilerConfig) -> Self {
        if self.timeout.is_none() {
            self.timeout = config.default_timeout.filter(|timeout| !timeout.is_zero());
        }
        self.parallel |= config.default_parallel;
        self.max_limit = config.max_limit;
        self.sort_alias_prefix = config.sort_alias_prefix.clone();
        self
    }

    /// Adds a filter; all filters must hold.
    pub fn filter(mut self, filter: Filter<M>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds several filters at once.
    pub fn filters<I>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = Filter<M>>,
    {
        self.filters.extend(filters);
        self
    }

    /// Adds a full-text search. Searches added separately are OR-ed.
    pub fn search(mut self, search: Search<M>) -> Self {
        self.searches.push(SearchGroup::One(search));
        self
    }

    /// Adds a group of searches that must all match.
    pub fn search_all(mut self, group: SearchAll<M>) -> Self {
        self.searches.push(SearchGroup::All(group));
        self
    }

    /// Appends an ordering term.
    pub fn order(mut self, sort: Sort<M>) -> Self {
        self.sorts.push(sort);
        self
    }

    /// Appends several ordering terms.
    pub fn order_by<I>(mut self, sorts: I) -> Self
    where
        I: IntoIterator<Item = Sort<M>>,
    {
        self.sorts.extend(sorts);
        self
    }

    /// Orders randomly; explicit sorts are ignored.
    pub fn order_random(mut self) -> Self {
        self.random = true;
        self
    }

    /// Skips the first `offset` records. Zero clears the offset.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = (offset > 0).then_some(offset);
        self
    }

    /// Returns at most `limit` records. Zero clears the limit.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = (limit > 0).then_some(limit);
        self
    }

    /// Resolves the record link at `key` in the result.
    pub fn fetch(mut self, key: &Key<M>) -> Self {
        self.fetch.push(key.path().clone());
        self
    }

    /// Aborts the statement after `timeout`. A zero duration clears the
    /// timeout, leaving any configured default to apply.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Lets the store evaluate the statement in parallel.
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Renders full records.
    pub fn build(&self) -> Rendered {
        self.build_as(SelectMode::All)
    }

    /// Renders the first matching record only.
    pub fn build_as_first(&self) -> Rendered {
        let mut spec = self.clone();
        spec.limit = Some(1);
        spec.mode = SelectMode::All;
        spec.render()
    }

    /// Renders record ids only.
    pub fn build_as_all_ids(&self) -> Rendered {
        self.build_as(SelectMode::Ids)
    }

    /// Renders a count of matching records.
    pub fn build_as_count(&self) -> Rendered {
        self.build_as(SelectMode::Count)
    }

    /// Renders a live subscription emitting full records.
    pub fn build_as_live(&self) -> Rendered {
        self.build_as(SelectMode::Live)
    }

    /// Renders a live subscription emitting diffs.
    pub fn build_as_live_diff(&self) -> Rendered {
        self.build_as(SelectMode::LiveDiff)
    }

    /// Changes feed for the target table; carries over the limit.
    pub fn build_as_changes(&self, since: Since) -> ChangesQuery {
        let changes = ChangesQuery::new(self.target.clone()).since(since);
        match self.effective_limit() {
            Some(limit) => changes.limit(limit),
            None => changes,
        }
    }

    /// The full-record statement with values inlined, for logs.
    pub fn describe(&self) -> String {
        self.build().describe()
    }

    fn build_as(&self, mode: SelectMode) -> Rendered {
        let mut spec = self.clone();
        spec.mode = mode;
        spec.render()
    }

    fn effective_limit(&self) -> Option<u64> {
        match (self.limit, self.max_limit) {
            (Some(limit), Some(max)) => Some(limit.min(max)),
            (limit, _) => limit,
        }
    }

    fn render(&self) -> Rendered {
        let mut ctx = Context::new();
        let live = self.mode.is_live();

        let mut conditions: Vec<String> = self
            .filters
            .iter()
            .map(|filter| filter.render(&mut ctx))
            .filter(|rendered| !rendered.is_empty())
            .collect();
        let (search_expr, clauses) = build_search_or(&self.searches, &mut ctx);
        if !search_expr.is_empty() {
            conditions.push(search_expr);
        }
        let condition = join_group(Logic::And, &conditions);

        let ordered = !live && self.mode != SelectMode::Count;
        let mut projections = Vec::new();
        let mut order_terms = Vec::new();
        if ordered && !self.random {
            self.sort_terms(&mut ctx, &mut projections, &mut order_terms);
        }
        if ordered {
            search_projections(&clauses, &mut ctx, &mut projections);
        }

        let mut out = String::new();
        match self.mode {
            SelectMode::All => out.push_str("SELECT *"),
            SelectMode::Ids => out.push_str("SELECT id"),
            SelectMode::Count => out.push_str("SELECT count() AS count"),
            SelectMode::Live => out.push_str("LIVE SELECT *"),
            SelectMode::LiveDiff => out.push_str("LIVE SELECT DIFF"),
        }
        for projection in &projections {
            out.push_str(", ");
            out.push_str(projection);
        }
        out.push_str(" FROM ");
        out.push_str(&self.target);

        if !condition.is_empty() {
            out.push_str(" WHERE ");
            out.push_str(&condition);
        }
        if self.mode == SelectMode::Count {
            out.push_str(" GROUP ALL");
        }
        if ordered {
            if self.random {
                out.push_str(" ORDER BY RAND()");
            } else if !order_terms.is_empty() {
                out.push_str(" ORDER BY ");
                out.push_str(&order_terms.join(", "));
            }
            if let Some(limit) = self.effective_limit() {
                out.push_str(&format!(" LIMIT {limit}"));
            }
            if let Some(offset) = self.offset {
                out.push_str(&format!(" START {offset}"));
            }
        }
        if self.mode != SelectMode::Count && !self.fetch.is_empty() {
            let paths: Vec<String> = self
                .fetch
                .iter()
                .map(|path| path.render_stripped(&mut ctx))
                .collect();
            out.push_str(" FETCH ");
            out.push_str(&paths.join(", "));
        }
        if !live {
            if let Some(timeout) = self.timeout {
                out.push_str(" TIMEOUT ");
                out.push_str(&format_duration(timeout));
            }
            if self.parallel {
                out.push_str(" PARALLEL");
            }
        }

        let rendered = ctx.finish(out);
        debug!(
            target: LOG_TARGET,
            mode = %self.mode,
            table = %self.target,
            vars = rendered.variables.len(),
            "query.render"
        );
        trace!(target: LOG_TARGET, statement = %rendered.describe(), "query.render.described");
        rendered
    }

    fn sort_terms(&self, ctx: &mut Context, projections: &mut Vec<String>, order: &mut Vec<String>) {
        let prefix = &self.sort_alias_prefix;
        let mut score_seen = false;
        for (idx, sort) in self.sorts.iter().enumerate() {
            let alias = match sort.spec() {
                SortSpec::Field { .. } => format!("{prefix}{idx}"),
                SortSpec::Score { .. } if !score_seen => {
                    score_seen = true;
                    format!("{prefix}score")
                }
                SortSpec::Score { .. } => format!("{prefix}score{idx}"),
            };
            projections.push(sort.spec().render_projection(ctx, &alias));
            order.push(sort.spec().render_order(&alias));
        }
    }
}

fn search_projections(clauses: &[SearchClause], ctx: &mut Context, projections: &mut Vec<String>) {
    for clause in clauses {
        let reference = clause.reference;
        if let Some((prefix, suffix)) = &clause.highlight {
            let prefix = ctx.as_var(prefix.as_str());
            let suffix = ctx.as_var(suffix.as_str());
            projections.push(format!(
                "search::highlight({prefix}, {suffix}, {reference}) AS __highlight_{reference}"
            ));
        }
        if clause.offsets {
            projections.push(format!(
                "search::offsets({reference}) AS __offsets_{reference}"
            ));
        }
    }
}
