//! Inline SQL rendering across dialects and cast modes.

use pretty_assertions::assert_eq;
use sqlbind::prelude::*;

fn render(dialect: Dialect, mode: CastMode, value: &SqlValue) -> String {
    let mut sql = String::new();
    let mut ctx = RenderContext::new(dialect, mode, &mut sql);
    resolve(value)
        .render_inline(&mut ctx, value)
        .expect("render failed");
    sql
}

#[test]
fn integers_render_bare_in_auto() {
    for dialect in [
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::MariaDb,
        Dialect::Sqlite,
        Dialect::SqlServer,
    ] {
        assert_eq!(render(dialect, CastMode::Auto, &SqlValue::Int(-3)), "-3");
    }
}

#[test]
fn always_mode_casts_with_dialect_syntax() {
    assert_eq!(
        render(Dialect::Postgres, CastMode::Always, &SqlValue::Int(-3)),
        "-3::integer"
    );
    assert_eq!(
        render(Dialect::MySql, CastMode::Always, &SqlValue::Int(-3)),
        "cast(-3 as integer)"
    );
    assert_eq!(
        render(Dialect::SqlServer, CastMode::Always, &SqlValue::Int(-3)),
        "cast(-3 as int)"
    );
}

#[test]
fn string_escaping_follows_dialect() {
    let v = SqlValue::Text(r"it's a\b".into());
    assert_eq!(
        render(Dialect::Postgres, CastMode::Never, &v),
        r"'it''s a\b'"
    );
    assert_eq!(
        render(Dialect::MySql, CastMode::Never, &v),
        r"'it''s a\\b'"
    );
}

#[test]
fn booleans_follow_capability_table() {
    let t = SqlValue::Boolean(true);
    assert_eq!(render(Dialect::Postgres, CastMode::Auto, &t), "true");
    assert_eq!(render(Dialect::MySql, CastMode::Auto, &t), "true");
    assert_eq!(render(Dialect::Sqlite, CastMode::Auto, &t), "1");
    assert_eq!(render(Dialect::SqlServer, CastMode::Auto, &t), "1");
}

#[test]
fn typed_null_casts_like_any_literal() {
    let null_uuid = SqlValue::Null(DataType::Uuid);
    assert_eq!(
        render(Dialect::Postgres, CastMode::Auto, &null_uuid),
        "NULL::uuid"
    );
    assert_eq!(render(Dialect::MySql, CastMode::Auto, &null_uuid), "NULL");
    assert_eq!(
        render(Dialect::Sqlite, CastMode::Always, &null_uuid),
        "cast(NULL as varchar(36))"
    );
}

#[test]
fn temporal_literals_use_keyword_form_where_supported() {
    let d = SqlValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    assert_eq!(
        render(Dialect::Postgres, CastMode::Auto, &d),
        "DATE '2024-01-05'"
    );
    assert_eq!(
        render(Dialect::MySql, CastMode::Auto, &d),
        "DATE '2024-01-05'"
    );
    assert_eq!(render(Dialect::Sqlite, CastMode::Auto, &d), "'2024-01-05'");
    assert_eq!(
        render(Dialect::Postgres, CastMode::Always, &d),
        "'2024-01-05'::date"
    );
}

#[test]
fn ambiguous_types_cast_in_auto_on_postgres_only() {
    let u = SqlValue::Uuid("550e8400-e29b-41d4-a716-446655440000".parse().unwrap());
    assert_eq!(
        render(Dialect::Postgres, CastMode::Auto, &u),
        "'550e8400-e29b-41d4-a716-446655440000'::uuid"
    );
    assert_eq!(
        render(Dialect::Sqlite, CastMode::Auto, &u),
        "'550e8400-e29b-41d4-a716-446655440000'"
    );

    let j = SqlValue::Jsonb(serde_json::json!([1, 2]));
    assert_eq!(render(Dialect::Postgres, CastMode::Auto, &j), "'[1,2]'::jsonb");
    assert_eq!(render(Dialect::Sqlite, CastMode::Auto, &j), "'[1,2]'");
}

#[test]
fn enum_array_casts_once_at_the_end() {
    let mood = EnumType::with_schema("public", "mood");
    let arr = SqlValue::Array {
        elem: DataType::Enum(mood.clone()),
        values: vec![
            SqlValue::Enum(EnumValue::new(mood.clone(), "happy")),
            SqlValue::Null(DataType::Enum(mood.clone())),
            SqlValue::Enum(EnumValue::new(mood, "sad")),
        ],
    };
    assert_eq!(
        render(Dialect::Postgres, CastMode::Auto, &arr),
        "ARRAY['happy', NULL, 'sad']::public.mood[]"
    );
    // No native arrays: degrade to a row list, enums as plain strings.
    assert_eq!(
        render(Dialect::MySql, CastMode::Auto, &arr),
        "('happy', NULL, 'sad')"
    );
}

#[test]
fn nan_and_infinity_idioms() {
    let nan = SqlValue::Double(f64::NAN);
    assert_eq!(
        render(Dialect::Postgres, CastMode::Auto, &nan),
        "'NaN'::double precision"
    );
    assert_eq!(render(Dialect::MySql, CastMode::Auto, &nan), "sqrt(-1)");

    let mut sql = String::new();
    let mut ctx = RenderContext::new(Dialect::Sqlite, CastMode::Auto, &mut sql);
    let err = resolve(&SqlValue::Double(f64::INFINITY))
        .render_inline(&mut ctx, &SqlValue::Double(f64::INFINITY))
        .unwrap_err();
    assert!(matches!(err, BindError::Unsupported { .. }));
}

#[test]
fn placeholder_markers_per_dialect() {
    let codec = codec_for(&DataType::Integer);
    for (dialect, expected) in [
        (Dialect::Postgres, "$2"),
        (Dialect::SqlServer, "@P2"),
        (Dialect::MySql, "?"),
        (Dialect::Sqlite, "?"),
    ] {
        let mut sql = String::new();
        let mut ctx = RenderContext::new(dialect, CastMode::Auto, &mut sql);
        ctx.param_index = 2;
        codec.render_placeholder(&mut ctx).unwrap();
        assert_eq!(sql, expected, "{}", dialect);
    }
}

#[test]
fn typed_placeholders_carry_cast_suffixes() {
    let mood = EnumType::with_schema("public", "mood");

    let mut sql = String::new();
    let mut ctx = RenderContext::new(Dialect::Postgres, CastMode::Auto, &mut sql);
    codec_for(&DataType::Enum(mood.clone()))
        .render_placeholder(&mut ctx)
        .unwrap();
    assert_eq!(sql, "$1::public.mood");

    let mut sql = String::new();
    let mut ctx = RenderContext::new(Dialect::Postgres, CastMode::Auto, &mut sql);
    codec_for(&DataType::Array(Box::new(DataType::Enum(mood))))
        .render_placeholder(&mut ctx)
        .unwrap();
    assert_eq!(sql, "$1::public.mood[]");
}

#[test]
fn never_mode_renders_identically_twice() {
    let v = SqlValue::Decimal("0.001".parse().unwrap());
    let a = render(Dialect::Postgres, CastMode::Never, &v);
    let b = render(Dialect::Postgres, CastMode::Never, &v);
    assert_eq!(a, b);
    assert_eq!(a, "0.001");
}
