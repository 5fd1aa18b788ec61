use std::collections::BTreeSet;

use myqb::bind::placeholders;
use myqb::ident::normalize;
use myqb::prelude::*;

fn assert_params_complete(q: &BuiltQuery) {
    let in_sql: BTreeSet<String> = placeholders(&q.sql).into_iter().collect();
    let in_map: BTreeSet<String> = q.params.names().map(str::to_string).collect();
    assert_eq!(in_sql, in_map, "sql: {}", q.sql);
}

#[test]
fn quoting_is_idempotent() {
    let tokens = [
        "id",
        "u.id",
        "db.t.col",
        "`id`",
        "u.`id`",
        "`a`.`b`",
        "42",
        "-1.5",
        "'text'",
        "\"text\"",
        "*",
        "u.*",
        "",
        "u.",
        "we`ird",
        "sp ace",
    ];
    for token in tokens {
        let once = normalize(token);
        assert_eq!(normalize(&once), once, "token {token:?}");
    }
}

#[test]
fn params_match_placeholders_across_nesting() {
    let u = table("t_user").alias("u");
    let orders = table("t_order")
        .select(["user_id", "SUM(amount) AS total"])
        .and_where(gt("amount", bind("min_amount", 10)))
        .group(["user_id"])
        .label("o");
    let vip = table("t_vip")
        .select(["user_id"])
        .and_where(eq("level", bind("level", 3)));

    let on = u.field("id").eq(orders.field("user_id"));
    let in_vip = u.field("id").in_(&vip);
    let total = orders.field("total").gt(bind("min_total", 100));
    let either = or([
        u.field("city").eq(bind("city", "hz")),
        u.field("tag").in_(bind("tags", vec!["a", "b"])),
    ]);

    let q = u
        .select([Field::new("u.id"), func::count("*").alias("n")])
        .inner_join(&orders, on)
        .where_all([in_vip, total, either])
        .group(["u.id"])
        .having(func::count("*").gt(bind("min_n", 1)))
        .build()
        .unwrap();

    assert_params_complete(&q);
    assert_eq!(q.params.len(), 6);
}

#[test]
fn params_match_placeholders_for_dml() {
    let rows = vec![
        row! { "name" => "a", "age" => 1 },
        row! { "name" => "b" },
    ];
    let q = table("t_user")
        .insert_on_duplicate_map_many(rows, [("age", 18)])
        .build()
        .unwrap();
    assert_params_complete(&q);

    let q = table("t_user")
        .and_where(eq("id", bind("id", 1)))
        .update_map([("score", set_expr("`score` + :inc", [("inc", 2)]))])
        .build()
        .unwrap();
    assert_params_complete(&q);
}

#[test]
fn clause_keywords_in_fixed_order() {
    let t = table("t_user").alias("u");
    let age = t.field("age");
    let city = t.field("city");
    let q = t
        .select([city.clone(), func::count("*").alias("n")])
        .and_where(age.gte(bind("age", 18)))
        .group([city.clone()])
        .having(func::count("*").gt(bind("n", 5)))
        .order([city])
        .limit(10)
        .offset(30)
        .build()
        .unwrap();

    let keywords = ["SELECT ", " FROM ", " WHERE ", " GROUP BY ", " HAVING ", " ORDER BY ", " LIMIT "];
    let positions: Vec<usize> = keywords
        .iter()
        .map(|k| q.sql.find(k).unwrap_or_else(|| panic!("missing {k} in {}", q.sql)))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "sql: {}", q.sql);
    assert!(q.sql.ends_with("LIMIT 30, 10"));
}

#[test]
fn and_is_associative_up_to_grouping() {
    let a = || eq("a", bind("a", 1));
    let b = || eq("b", bind("b", 2));
    let c = || eq("c", bind("c", 3));

    let left = and([and([a(), b()]), c()]);
    let right = and([a(), and([b(), c()])]);
    let flat = |s: &str| s.replace(['(', ')'], "");

    assert_eq!(flat(left.sql()), flat(right.sql()));
    assert_eq!(flat(left.sql()), "`a` = :a AND `b` = :b AND `c` = :c");
    assert_eq!(left.params(), right.params());
}

#[test]
fn zero_arg_combinators_render_nothing() {
    let q = table("t").and_where(and([])).and_where(or([])).build().unwrap();
    assert_eq!(q.sql, "SELECT * FROM t");
    assert!(!q.sql.contains("()"));
}

#[test]
fn multi_row_insert_disambiguates() {
    let q = table("t")
        .insert_many(vec![row! { "a" => 1 }, row! { "a" => 2 }])
        .build()
        .unwrap();
    assert_eq!(q.params["a_0"], Value::Int(1));
    assert_eq!(q.params["a_1"], Value::Int(2));
    assert_eq!(q.sql.matches("(`a`)").count(), 1);
}

#[test]
fn upsert_params_do_not_collide() {
    let q = table("t_user")
        .insert_on_duplicate_map_many(vec![row! { "name" => "a" }], [("name", "b")])
        .build()
        .unwrap();
    assert_eq!(q.params["name_0"], Value::from("a"));
    assert_eq!(q.params["name_upd"], Value::from("b"));
    assert_eq!(q.params.len(), 2);
}

#[test]
fn literal_path_cannot_break_out() {
    let q = table("t")
        .and_where(eq("name", "x' OR '1'='1"))
        .build()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM t WHERE `name` = 'x'' OR ''1''=''1'");
    assert!(q.params.is_empty());

    let q = table("t").and_where(eq("t", "10:30")).build().unwrap();
    assert!(placeholders(&q.sql).is_empty());
    assert_eq!(q.to_positional().unwrap().sql, "SELECT * FROM t WHERE `t` = '10:30'");
}
