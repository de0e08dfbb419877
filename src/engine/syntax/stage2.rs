//! Stage 2 turns Pest's pairs into a [Query].
//!
//! Pest already guarantees the shape of the tree, so most of this is walking it and copying
//! strings out of the input. The only thing that can still fail is the operator, which is checked
//! against the operators we know how to evaluate.
use crate::engine::structure::{
    ColumnRef, Condition, FieldSpec, JoinKind, JoinSpec, Operator, Query,
};
use crate::engine::syntax::stage1::{Rule, Stage1Rep};
use log::trace;
use pest::iterators::{Pair, Pairs};

/// Can't be a From because of the operator check, see the module docs.
impl<'a> TryFrom<Stage1Rep<'a>> for Query {
    type Error = crate::Error;

    fn try_from(stage1: Stage1Rep<'a>) -> Result<Self, Self::Error> {
        trace!("translating query: {}", stage1.input);

        translate_query(stage1.pest)
    }
}

fn translate_query(mut pairs: Pairs<Rule>) -> Result<Query, crate::Error> {
    let root = pairs.next().expect("Impossible due to pest parsing");
    assert_eq!(Rule::query, root.as_rule());

    let mut inners = root.into_inner();
    let head = inners.next().expect("Guaranteed by syntax");
    let (fields, table, join) = translate_head(head);

    let mut conditions = Vec::new();
    let mut group_by = None;
    for clause in inners {
        match clause.as_rule() {
            Rule::where_clause => conditions = translate_where(clause)?,
            Rule::group_by_clause => group_by = Some(translate_group_by(clause)),
            Rule::EOI => {}
            rule => unreachable!("Unexpected {rule:?} after the query head"),
        }
    }

    Ok(Query {
        fields,
        table,
        join,
        conditions,
        group_by,
    })
}

fn translate_head(head: Pair<Rule>) -> (Vec<FieldSpec>, String, Option<JoinSpec>) {
    let mut fields = Vec::new();
    let mut table = None;
    let mut join = None;

    for pair in head.into_inner() {
        match pair.as_rule() {
            Rule::fields => fields = pair.into_inner().map(translate_field).collect(),
            Rule::identifier => table = Some(pair.as_str().to_owned()),
            Rule::join_clause => join = Some(translate_join(pair)),
            // keywords
            _ => {}
        }
    }

    (fields, table.expect("Guaranteed by syntax"), join)
}

fn translate_field(field: Pair<Rule>) -> FieldSpec {
    let inner = field.into_inner().next().expect("Guaranteed by syntax");

    match inner.as_rule() {
        Rule::aggregate => translate_aggregate(inner),
        Rule::column_ref => translate_column_ref(inner).into(),
        rule => unreachable!("Fields can't be {rule:?}"),
    }
}

fn translate_aggregate(aggregate: Pair<Rule>) -> FieldSpec {
    // The whole text, alias included, becomes the field's key. Pest leaves the whitespace it
    // skipped looking for an alias at the end of the span.
    let text = aggregate.as_str().trim_end().to_owned();
    let mut inners = aggregate.into_inner();

    let function = inners.next().expect("Guaranteed by syntax").as_str().to_owned();
    let column = translate_column_ref(inners.next().expect("Guaranteed by syntax"));

    FieldSpec::Aggregate {
        function,
        column,
        text,
    }
}

fn translate_join(join: Pair<Rule>) -> JoinSpec {
    let mut kind = None;
    let mut table = None;
    let mut keys = Vec::with_capacity(2);

    for pair in join.into_inner() {
        match pair.as_rule() {
            Rule::join_kind => kind = Some(translate_join_kind(pair)),
            Rule::identifier => table = Some(pair.as_str().to_owned()),
            Rule::column_ref => keys.push(translate_column_ref(pair)),
            _ => {}
        }
    }

    let mut keys = keys.into_iter();
    JoinSpec {
        kind: kind.expect("Guaranteed by syntax"),
        table: table.expect("Guaranteed by syntax"),
        left_key: keys.next().expect("Guaranteed by syntax"),
        right_key: keys.next().expect("Guaranteed by syntax"),
    }
}

fn translate_join_kind(kind: Pair<Rule>) -> JoinKind {
    let keyword = kind.into_inner().next().expect("Guaranteed by syntax");

    match keyword.as_rule() {
        Rule::kw_inner => JoinKind::Inner,
        Rule::kw_left => JoinKind::Left,
        Rule::kw_right => JoinKind::Right,
        rule => unreachable!("Not a join kind: {rule:?}"),
    }
}

fn translate_where(clause: Pair<Rule>) -> Result<Vec<Condition>, crate::Error> {
    // AND and OR are both just separators here.
    clause
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::condition)
        .map(translate_condition)
        .collect()
}

fn translate_condition(condition: Pair<Rule>) -> Result<Condition, crate::Error> {
    let mut inners = condition.into_inner();

    let field = translate_column_ref(inners.next().expect("Guaranteed by syntax"));
    let operator: Operator = inners.next().expect("Guaranteed by syntax").as_str().parse()?;
    let value = translate_value(inners.next().expect("Guaranteed by syntax"));

    Ok(Condition {
        field,
        operator,
        value,
    })
}

fn translate_value(value: Pair<Rule>) -> String {
    let inner = value.into_inner().next().expect("Guaranteed by syntax");

    match inner.as_rule() {
        Rule::bare_value => inner.as_str().to_owned(),
        // The quotes themselves are not part of the value.
        Rule::quoted_value => inner
            .into_inner()
            .next()
            .expect("Guaranteed by syntax")
            .as_str()
            .to_owned(),
        rule => unreachable!("Not a value: {rule:?}"),
    }
}

fn translate_group_by(clause: Pair<Rule>) -> Vec<ColumnRef> {
    clause
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::column_ref)
        .map(translate_column_ref)
        .collect()
}

fn translate_column_ref(column_ref: Pair<Rule>) -> ColumnRef {
    let mut identifiers = column_ref.into_inner().map(|pair| pair.as_str().to_owned());

    let first = identifiers.next().expect("Guaranteed by syntax");
    match identifiers.next() {
        Some(column) => ColumnRef::qualified(first, column),
        None => ColumnRef::named(first),
    }
}
