//! MySQL function helpers.
//!
//! Column arguments take [`IntoField`] (a `&str` is quoted as a column name).
//! Value arguments take [`Operand`], so a `&str` there is a quoted string
//! literal and a [`Field`] is embedded as an expression.

use super::condition::{Condition, Operand};
use super::field::{Field, IntoField};
use super::{Acc, SqlFragment};
use crate::error::{QbError, QbResult};
use crate::value::escape_literal;

fn wrap(template: impl FnOnce(&str) -> String, arg: impl IntoField) -> Field {
    let field = arg.into_field();
    let mut acc = Acc::new();
    acc.absorb(&field);
    Field::computed(template(field.sql()), acc)
}

fn call(name: &str, args: Vec<Operand>) -> Field {
    let mut acc = Acc::new();
    let rendered: Vec<String> = args.into_iter().map(|a| a.render_value(&mut acc)).collect();
    Field::computed(format!("{name}({})", rendered.join(", ")), acc)
}

// ==================== Aggregates ====================

/// `SUM(x)`
pub fn sum(field: impl IntoField) -> Field {
    wrap(|s| format!("SUM({s})"), field)
}

/// `COUNT(x)`; `count("*")` renders `COUNT(*)`.
pub fn count(field: impl IntoField) -> Field {
    wrap(|s| format!("COUNT({s})"), field)
}

/// `MIN(x)`
pub fn min(field: impl IntoField) -> Field {
    wrap(|s| format!("MIN({s})"), field)
}

/// `MAX(x)`
pub fn max(field: impl IntoField) -> Field {
    wrap(|s| format!("MAX({s})"), field)
}

/// `DISTINCT a, b, ...`
pub fn distinct<F: IntoField>(fields: impl IntoIterator<Item = F>) -> Field {
    let mut acc = Acc::new();
    let mut parts = Vec::new();
    for f in fields {
        let f = f.into_field();
        acc.absorb(&f);
        parts.push(f.sql().to_string());
    }
    if parts.is_empty() {
        return Field::failed(QbError::InvalidField("DISTINCT requires at least one field".into()));
    }
    Field::computed(format!("DISTINCT {}", parts.join(", ")), acc)
}

/// `GROUP_CONCAT(x)` or `GROUP_CONCAT(x SEPARATOR 'sep')`
pub fn group_concat(field: impl IntoField, separator: Option<&str>) -> Field {
    match separator {
        Some(sep) => {
            let sep = escape_literal(sep);
            wrap(|s| format!("GROUP_CONCAT({s} SEPARATOR '{sep}')"), field)
        }
        None => wrap(|s| format!("GROUP_CONCAT({s})"), field),
    }
}

// ==================== Control flow ====================

/// `IF(cond, a, b)`
pub fn if_(cond: Condition, then: impl Into<Operand>, otherwise: impl Into<Operand>) -> Field {
    let mut acc = Acc::new();
    acc.absorb(&cond);
    let a = then.into().render_value(&mut acc);
    let b = otherwise.into().render_value(&mut acc);
    Field::computed(format!("IF({}, {a}, {b})", cond.sql()), acc)
}

/// `IFNULL(x, default)`
pub fn if_null(field: impl IntoField, default: impl Into<Operand>) -> Field {
    call("IFNULL", vec![field.into_field().into(), default.into()])
}

/// One `WHEN cond THEN value` branch of a [`case`] expression.
pub fn when(cond: Condition, value: impl Into<Operand>) -> Field {
    let mut acc = Acc::new();
    acc.absorb(&cond);
    let v = value.into().render_value(&mut acc);
    Field::computed(format!("WHEN {} THEN {v}", cond.sql()), acc)
}

/// `CASE WHEN ... THEN ... END`. Fails with [`QbError::EmptyCase`] when no
/// branch is given.
pub fn case(whens: impl IntoIterator<Item = Field>) -> QbResult<Field> {
    build_case(whens, None)
}

/// `CASE WHEN ... THEN ... ELSE e END`
pub fn case_else(
    whens: impl IntoIterator<Item = Field>,
    otherwise: impl Into<Operand>,
) -> QbResult<Field> {
    build_case(whens, Some(otherwise.into()))
}

fn build_case(whens: impl IntoIterator<Item = Field>, otherwise: Option<Operand>) -> QbResult<Field> {
    let mut acc = Acc::new();
    let mut sql = String::from("CASE");
    let mut branches = 0usize;
    for w in whens {
        acc.absorb(&w);
        sql.push(' ');
        sql.push_str(w.sql());
        branches += 1;
    }
    if branches == 0 {
        return Err(QbError::EmptyCase);
    }
    if let Some(e) = otherwise {
        let v = e.render_value(&mut acc);
        sql.push_str(" ELSE ");
        sql.push_str(&v);
    }
    sql.push_str(" END");
    Ok(Field::computed(sql, acc))
}

// ==================== Date / time ====================

/// `ADDDATE(x, INTERVAL n DAY)`
pub fn add_date(start: impl Into<Operand>, days: i64) -> Field {
    let mut acc = Acc::new();
    let s = start.into().render_value(&mut acc);
    Field::computed(format!("ADDDATE({s}, INTERVAL {days} DAY)"), acc)
}

/// `DATE_FORMAT(x, 'fmt')`
pub fn date_format(field: impl IntoField, format: &str) -> Field {
    let fmt = escape_literal(format);
    wrap(|s| format!("DATE_FORMAT({s}, '{fmt}')"), field)
}

/// `ADDTIME(x, t)`
pub fn add_time(start: impl Into<Operand>, time: impl Into<Operand>) -> Field {
    call("ADDTIME", vec![start.into(), time.into()])
}

/// `DATE_SUB(x, <interval>)`; `interval` is verbatim, e.g. `INTERVAL 7 DAY`.
pub fn date_sub(start: impl Into<Operand>, interval: &str) -> Field {
    call("DATE_SUB", vec![start.into(), Operand::Raw(interval.to_string())])
}

/// `UNIX_TIMESTAMP(x)`
pub fn unix_timestamp(time: impl Into<Operand>) -> Field {
    call("UNIX_TIMESTAMP", vec![time.into()])
}

/// `CURDATE()`
pub fn cur_date() -> Field {
    Field::raw("CURDATE()")
}

/// `NOW()`
pub fn now() -> Field {
    Field::raw("NOW()")
}

// ==================== Misc ====================

/// `ROUND(x, digits)`
pub fn round(field: impl IntoField, digits: i32) -> Field {
    wrap(|s| format!("ROUND({s}, {digits})"), field)
}

/// `CAST(x AS CHAR)`
pub fn cast_char(field: impl IntoField) -> Field {
    wrap(|s| format!("CAST({s} AS CHAR)"), field)
}

/// `CONCAT(a, b, ...)`
pub fn concat<O: Into<Operand>>(parts: impl IntoIterator<Item = O>) -> Field {
    call("CONCAT", parts.into_iter().map(Into::into).collect())
}

/// `POINT(lng, lat)`
pub fn point(longitude: impl Into<Operand>, latitude: impl Into<Operand>) -> Field {
    call("POINT", vec![longitude.into(), latitude.into()])
}

/// `ST_DISTANCE_SPHERE(p1, p2)`
pub fn st_distance_sphere(p1: impl Into<Operand>, p2: impl Into<Operand>) -> Field {
    call("ST_DISTANCE_SPHERE", vec![p1.into(), p2.into()])
}

/// `RAND()`
pub fn rand() -> Field {
    Field::raw("RAND()")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use crate::expr::{bind, eq, gt};

    #[test]
    fn aggregates_quote_bare_names() {
        assert_eq!(count("*").sql(), "COUNT(*)");
        assert_eq!(count("id").sql(), "COUNT(`id`)");
        assert_eq!(sum("u.score").sql(), "SUM(u.`score`)");
        assert_eq!(min("age").sql(), "MIN(`age`)");
        assert_eq!(max(Field::new("a").add(1)).sql(), "MAX(`a` + 1)");
    }

    #[test]
    fn distinct_list() {
        assert_eq!(distinct(["a", "b"]).sql(), "DISTINCT `a`, `b`");
        assert!(distinct(Vec::<&str>::new()).error().is_some());
    }

    #[test]
    fn if_and_ifnull() {
        let f = if_(gt("age", bind("age", 18)), "adult", "minor");
        assert_eq!(f.sql(), "IF(`age` > :age, 'adult', 'minor')");
        assert_eq!(f.params()["age"], Value::Int(18));
        assert_eq!(if_null("nick", "").sql(), "IFNULL(`nick`, '')");
    }

    #[test]
    fn case_expression() {
        let f = case_else(
            [
                when(eq("status", 1), "on"),
                when(eq("status", bind("off", 0)), "off"),
            ],
            "unknown",
        )
        .unwrap();
        assert_eq!(
            f.sql(),
            "CASE WHEN `status` = 1 THEN 'on' WHEN `status` = :off THEN 'off' ELSE 'unknown' END"
        );
        assert_eq!(f.params()["off"], Value::Int(0));
    }

    #[test]
    fn case_without_branches_fails() {
        assert_eq!(case(Vec::new()).unwrap_err(), QbError::EmptyCase);
    }

    #[test]
    fn case_without_else() {
        let f = case([when(eq("a", 1), 10)]).unwrap();
        assert_eq!(f.sql(), "CASE WHEN `a` = 1 THEN 10 END");
    }

    #[test]
    fn dates() {
        assert_eq!(add_date(Field::new("created"), 7).sql(), "ADDDATE(`created`, INTERVAL 7 DAY)");
        assert_eq!(
            date_format("created", "%Y-%m-%d %H:%i").sql(),
            "DATE_FORMAT(`created`, '%Y-%m-%d %H::%i')"
        );
        assert_eq!(add_time(now(), "01:00:00").sql(), "ADDTIME(NOW(), '01::00::00')");
        assert_eq!(date_sub(cur_date(), "INTERVAL 1 DAY").sql(), "DATE_SUB(CURDATE(), INTERVAL 1 DAY)");
        assert_eq!(unix_timestamp("2024-01-01").sql(), "UNIX_TIMESTAMP('2024-01-01')");
    }

    #[test]
    fn misc() {
        assert_eq!(round("price", 2).sql(), "ROUND(`price`, 2)");
        assert_eq!(cast_char("id").sql(), "CAST(`id` AS CHAR)");
        assert_eq!(
            concat([Operand::from("#"), Field::new("id").into()]).sql(),
            "CONCAT('#', `id`)"
        );
        assert_eq!(
            group_concat("name", Some(",")).sql(),
            "GROUP_CONCAT(`name` SEPARATOR ',')"
        );
        assert_eq!(group_concat("name", None).sql(), "GROUP_CONCAT(`name`)");
        assert_eq!(rand().sql(), "RAND()");
    }

    #[test]
    fn geo() {
        let p = point(bind("lng", 120.1), bind("lat", 30.2));
        let d = st_distance_sphere(Field::new("location"), p);
        assert_eq!(d.sql(), "ST_DISTANCE_SPHERE(`location`, POINT(:lng, :lat))");
        assert_eq!(d.params().len(), 2);
    }
}
