use std::sync::Arc;

use apollo_compiler::name;
use graphql_field_groups::Entity;
use graphql_field_groups::EntityKind;
use graphql_field_groups::FieldError;
use graphql_field_groups::FieldKind;
use graphql_field_groups::ResolvedValue;
use graphql_field_groups::Source;
use graphql_field_groups::Visibility;
use graphql_field_groups::descriptor::Layout;
use graphql_field_groups::descriptor::NewLines;
use graphql_field_groups::host::AllowAll;
use graphql_field_groups::host::LookupKind;
use graphql_field_groups::host::memory::MemoryConfigProvider;
use graphql_field_groups::host::memory::MemoryEntityStore;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json_bytes::json;

use crate::common::compile_groups;
use crate::common::content;
use crate::common::context;
use crate::common::entity_ids;
use crate::common::field;
use crate::common::group;
use crate::common::post_fields;
use crate::common::resolve_group_field;
use crate::common::resolve_post_field;
use crate::common::term;

const POST: i64 = 12;

fn post() -> Entity {
    content("post", POST)
}

fn store() -> MemoryEntityStore {
    MemoryEntityStore::default()
        .with_entity(LookupKind::Content, content("post", 10).with_visibility(Visibility::Draft))
        .with_entity(LookupKind::Content, content("post", 11))
        .with_entity(LookupKind::Content, content("page", 20))
        .with_entity(LookupKind::Content, content("product", 30))
        .with_entity(LookupKind::Media, content("attachment", 5))
        .with_entity(LookupKind::Media, content("attachment", 7))
        .with_entity(LookupKind::Term, term("category", 1))
        .with_entity(LookupKind::Term, term("category", 2))
        .with_entity(LookupKind::Term, term("post_tag", 3))
        .with_entity(LookupKind::User, Entity::new(EntityKind::User, 40))
        .with_entity(
            LookupKind::User,
            Entity::new(EntityKind::User, 41).with_visibility(Visibility::Private),
        )
}

#[rstest]
#[case::text(FieldKind::Text, json!("hello"), json!("hello"))]
#[case::number(FieldKind::Number, json!("12.5"), json!(12.5))]
#[case::range(FieldKind::Range, json!("3"), json!(3))]
#[case::true_false(FieldKind::TrueFalse, json!("1"), json!(true))]
#[case::false_is_kept(FieldKind::TrueFalse, json!(0), json!(false))]
#[case::radio(FieldKind::Radio, json!("blue"), json!("blue"))]
fn scalar_values_are_coerced(
    #[case] kind: FieldKind,
    #[case] stored: serde_json_bytes::Value,
    #[case] expected: serde_json_bytes::Value,
) {
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![field("field_value", "value", kind)])])
            .with_value(POST.to_string(), "field_value", stored),
    );
    let context = context(provider, store());
    assert_eq!(
        resolve_post_field(&registry, &context, post(), "value"),
        ResolvedValue::Leaf(expected)
    );
}

#[test]
fn unset_values_resolve_to_null() {
    let (registry, provider) = compile_groups(MemoryConfigProvider::new(vec![post_fields(vec![
        field("field_text", "text", FieldKind::Text),
        field("field_checkbox", "checkbox", FieldKind::Checkbox),
        field("field_gallery", "gallery", FieldKind::Gallery),
        field("field_image", "image", FieldKind::Image),
        field("field_link", "link", FieldKind::Link),
    ])]));
    let context = context(provider, store());
    for name in ["text", "checkbox", "gallery", "image", "link"] {
        assert!(
            resolve_post_field(&registry, &context, post(), name).is_null(),
            "{name} should be null"
        );
    }
}

#[test]
fn list_fields_resolve_to_empty_lists_when_unset() {
    let mut select = field("field_select", "choices", FieldKind::Select);
    select.multiple = Some(true);
    let mut rows = field("field_rows", "rows", FieldKind::Repeater);
    rows.sub_fields = vec![field("field_row_title", "title", FieldKind::Text)];
    let mut terms = field("field_terms", "terms", FieldKind::Taxonomy);
    terms.taxonomy = Some("category".into());
    let (registry, provider) = compile_groups(MemoryConfigProvider::new(vec![post_fields(vec![
        select, rows, terms,
    ])]));
    let context = context(provider, store());

    for name in ["choices", "rows", "terms"] {
        assert_eq!(
            resolve_post_field(&registry, &context, post(), name),
            ResolvedValue::List(vec![]),
            "{name} should be an empty list"
        );
    }
}

#[test]
fn select_and_checkbox_values() {
    let mut multiple = field("field_multiple", "multiple", FieldKind::Select);
    multiple.multiple = Some(true);
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![
            multiple,
            field("field_single", "single", FieldKind::Select),
            field("field_boxes", "boxes", FieldKind::Checkbox),
            field("field_not_a_list", "notAList", FieldKind::Checkbox),
        ])])
        .with_value(POST.to_string(), "field_multiple", "red")
        .with_value(POST.to_string(), "field_single", json!(["green", "blue"]))
        .with_value(POST.to_string(), "field_boxes", json!(["a", "b"]))
        .with_value(POST.to_string(), "field_not_a_list", "a"),
    );
    let context = context(provider, store());
    let resolve = |name| resolve_post_field(&registry, &context, post(), name);

    assert_eq!(resolve("multiple"), ResolvedValue::list([ResolvedValue::leaf("red")]));
    assert_eq!(resolve("single"), ResolvedValue::leaf("green"));
    assert_eq!(
        resolve("boxes"),
        ResolvedValue::list([ResolvedValue::leaf("a"), ResolvedValue::leaf("b")])
    );
    assert!(resolve("notAList").is_null());
}

#[test]
fn textarea_new_lines_are_formatted() {
    let mut paragraphs = field("field_paragraphs", "paragraphs", FieldKind::Textarea);
    paragraphs.new_lines = Some(NewLines::Wpautop);
    let mut breaks = field("field_breaks", "breaks", FieldKind::Textarea);
    breaks.new_lines = Some(NewLines::Br);
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![
            paragraphs,
            breaks,
            field("field_plain", "plain", FieldKind::Textarea),
        ])])
        .with_value(POST.to_string(), "field_paragraphs", "a\n\nb")
        .with_value(POST.to_string(), "field_breaks", "a\nb")
        .with_value(POST.to_string(), "field_plain", "a\nb"),
    );
    let context = context(provider, store());
    let resolve = |name| resolve_post_field(&registry, &context, post(), name);

    assert_eq!(resolve("paragraphs"), ResolvedValue::leaf("<p>a</p>\n<p>b</p>\n"));
    assert_eq!(resolve("breaks"), ResolvedValue::leaf("a<br />\nb"));
    assert_eq!(resolve("plain"), ResolvedValue::leaf("a\nb"));
}

#[test]
fn dates_are_rendered_with_the_return_format() {
    let mut date = field("field_date", "date", FieldKind::DatePicker);
    date.return_format = Some("d/m/Y".into());
    let mut time = field("field_time", "time", FieldKind::TimePicker);
    time.return_format = Some("g:i a".into());
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![
            date,
            time,
            field("field_raw", "raw", FieldKind::DateTimePicker),
        ])])
        .with_value(POST.to_string(), "field_date", "20240131")
        .with_value(POST.to_string(), "field_time", "15:07:09")
        .with_value(POST.to_string(), "field_raw", "2024-01-31 15:07:09"),
    );
    let context = context(provider, store());
    let resolve = |name| resolve_post_field(&registry, &context, post(), name);

    assert_eq!(resolve("date"), ResolvedValue::leaf("31/01/2024"));
    assert_eq!(resolve("time"), ResolvedValue::leaf("3:07 pm"));
    assert_eq!(resolve("raw"), ResolvedValue::leaf("2024-01-31 15:07:09"));
}

#[test]
fn links_resolve_to_structured_values() {
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![
            field("field_link", "link", FieldKind::Link),
            field("field_url", "url", FieldKind::Link),
        ])])
        .with_value(
            POST.to_string(),
            "field_link",
            json!({ "url": "https://example.com", "title": "Example", "target": "_blank" }),
        )
        .with_value(POST.to_string(), "field_url", "https://example.org"),
    );
    let context = context(provider, store());

    let link = resolve_post_field(&registry, &context, post(), "link");
    let link = link.as_object().unwrap();
    assert_eq!(
        registry.resolve_field("AcfLink", "target", link, &context).unwrap(),
        ResolvedValue::leaf("_blank")
    );
    let url = resolve_post_field(&registry, &context, post(), "url");
    let url = url.as_object().unwrap();
    assert_eq!(
        registry.resolve_field("AcfLink", "url", url, &context).unwrap(),
        ResolvedValue::leaf("https://example.org")
    );
    assert!(registry.resolve_field("AcfLink", "title", url, &context).unwrap().is_null());
}

#[rstest]
#[case(json!([5, 7]), vec![5, 7])]
#[case(json!([7, 5]), vec![7, 5])]
#[case(json!(["7", 99, 5]), vec![7, 5])]
fn galleries_keep_the_stored_order(
    #[case] stored: serde_json_bytes::Value,
    #[case] expected: Vec<i64>,
) {
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![field(
            "field_gallery",
            "gallery",
            FieldKind::Gallery,
        )])])
        .with_value(POST.to_string(), "field_gallery", stored),
    );
    let context = context(provider, store());
    assert_eq!(
        entity_ids(&resolve_post_field(&registry, &context, post(), "gallery")),
        expected
    );
}

#[test]
fn images_load_attachments() {
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![
            field("field_image", "image", FieldKind::Image),
            field("field_file", "file", FieldKind::File),
        ])])
        .with_value(POST.to_string(), "field_image", json!({ "ID": 5, "url": "a.jpg" }))
        .with_value(POST.to_string(), "field_file", 404),
    );
    let context = context(provider, store());

    let image = resolve_post_field(&registry, &context, post(), "image");
    assert_eq!(image.as_object().unwrap().as_entity().unwrap().id, 5);
    assert!(resolve_post_field(&registry, &context, post(), "file").is_null());
}

#[test]
fn repeater_rows_resolve_their_sub_fields() {
    let mut terms = field("field_terms", "terms", FieldKind::Taxonomy);
    terms.taxonomy = Some("category".into());
    let mut rows = field("field_rows", "rows", FieldKind::Repeater);
    rows.sub_fields = vec![terms];
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![rows])]).with_value(
            POST.to_string(),
            "field_rows",
            json!([
                { "field_terms": [1] },
                { "field_terms": [2, 1] },
                { "terms": [2, 3] }
            ]),
        ),
    );
    let context = context(provider, store());

    let rows = resolve_post_field(&registry, &context, post(), "rows");
    let terms: Vec<Vec<i64>> = rows
        .as_list()
        .unwrap()
        .iter()
        .map(|row| {
            let row = row.as_object().unwrap();
            entity_ids(
                &registry
                    .resolve_field("PostFieldsRows", "terms", row, &context)
                    .unwrap(),
            )
        })
        .collect();
    // term 3 is a tag, not a category
    assert_eq!(terms, vec![vec![1], vec![2, 1], vec![2]]);
}

#[test]
fn group_fields_resolve_against_the_same_root() {
    let mut details = field("field_details", "details", FieldKind::Group);
    details.sub_fields = vec![field("field_color", "color", FieldKind::Text)];
    let mut rows = field("field_rows", "rows", FieldKind::Repeater);
    rows.sub_fields = vec![details.clone()];
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![details, rows])])
            .with_value(POST.to_string(), "field_color", "red")
            .with_value(
                POST.to_string(),
                "field_rows",
                json!([{ "field_details": { "field_color": "blue" } }]),
            ),
    );
    let context = context(provider, store());

    let details = resolve_post_field(&registry, &context, post(), "details");
    let details = details.as_object().unwrap();
    assert_eq!(details, &Source::Entity(post()));
    assert_eq!(
        registry
            .resolve_field("PostFieldsDetails", "color", details, &context)
            .unwrap(),
        ResolvedValue::leaf("red")
    );

    let rows = resolve_post_field(&registry, &context, post(), "rows");
    let row = rows.as_list().unwrap()[0].as_object().unwrap().clone();
    let row_details = registry
        .resolve_field("PostFieldsRows", "details", &row, &context)
        .unwrap();
    assert_eq!(
        registry
            .resolve_field(
                "PostFieldsRowsDetails",
                "color",
                row_details.as_object().unwrap(),
                &context
            )
            .unwrap(),
        ResolvedValue::leaf("blue")
    );
}

#[test]
fn flexible_content_rows_are_discriminated_by_layout() {
    let mut sections = field("field_sections", "sections", FieldKind::FlexibleContent);
    sections.layouts = vec![
        Layout {
            key: "layout_hero".into(),
            name: "hero".into(),
            label: "Hero".into(),
            sub_fields: vec![field("field_hero_title", "title", FieldKind::Text)],
        },
        Layout {
            key: "layout_quote".into(),
            name: "quote".into(),
            label: "Quote".into(),
            sub_fields: vec![field("field_quote_text", "text", FieldKind::Text)],
        },
    ];
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![sections])]).with_value(
            POST.to_string(),
            "field_sections",
            json!([
                { "acf_fc_layout": "quote", "field_quote_text": "To be" },
                { "acf_fc_layout": "hero", "title": "Welcome" },
                { "acf_fc_layout": "removed" }
            ]),
        ),
    );
    let context = context(provider, store());

    let sections = resolve_post_field(&registry, &context, post(), "sections");
    let rows = sections.as_list().unwrap();
    assert_eq!(rows.len(), 3);
    let types: Vec<_> = rows
        .iter()
        .map(|row| registry.resolve_type("PostFieldsSectionsLayout", row.as_object().unwrap()))
        .collect();
    assert_eq!(types[0], Ok(name!("PostFieldsSectionsQuote")));
    assert_eq!(types[1], Ok(name!("PostFieldsSectionsHero")));
    assert_eq!(
        types[2],
        Err(FieldError::UndiscriminatedEntity {
            abstract_type: "PostFieldsSectionsLayout".into(),
            kind: "row:removed".into(),
        })
    );
    assert_eq!(
        registry
            .resolve_field("PostFieldsSectionsHero", "title", rows[1].as_object().unwrap(), &context)
            .unwrap(),
        ResolvedValue::leaf("Welcome")
    );
}

#[test]
fn relational_fields_exclude_unpublished_content() {
    let mut single = field("field_single", "single", FieldKind::PostObject);
    single.target_kinds = vec!["post".into()];
    let mut multiple = field("field_multiple", "multiple", FieldKind::PostObject);
    multiple.target_kinds = vec!["post".into()];
    multiple.multiple = Some(true);
    let mut related = field("field_related", "related", FieldKind::Relationship);
    related.target_kinds = vec!["post".into()];
    let mut drafts = field("field_drafts", "drafts", FieldKind::Relationship);
    drafts.target_kinds = vec!["post".into()];
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![single, multiple, related, drafts])])
            .with_value(POST.to_string(), "field_single", json!([10, 11]))
            .with_value(POST.to_string(), "field_multiple", json!([10]))
            .with_value(POST.to_string(), "field_related", json!([10, 11]))
            .with_value(POST.to_string(), "field_drafts", json!([10])),
    );
    let context = context(provider, store());
    let resolve = |name| resolve_post_field(&registry, &context, post(), name);

    assert_eq!(resolve("single").as_object().unwrap().as_entity().unwrap().id, 11);
    assert!(resolve("multiple").is_null());
    assert_eq!(entity_ids(&resolve("related")), vec![11]);
    assert_eq!(resolve("drafts"), ResolvedValue::List(vec![]));
}

#[rstest]
#[case::post_object(FieldKind::PostObject)]
#[case::page_link(FieldKind::PageLink)]
fn multiple_relational_fields_resolve_every_published_target(#[case] kind: FieldKind) {
    let mut linked = field("field_linked", "linked", kind);
    linked.target_kinds = vec!["post".into(), "page".into()];
    linked.multiple = Some(true);
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![linked])]).with_value(
            POST.to_string(),
            "field_linked",
            json!([10, 11, 30, 20]),
        ),
    );
    let context = context(provider, store());

    let linked = resolve_post_field(&registry, &context, post(), "linked");
    assert_eq!(entity_ids(&linked), vec![11, 20]);
    let types: Vec<_> = linked
        .as_list()
        .unwrap()
        .iter()
        .map(|value| {
            registry
                .resolve_type("PostFieldsLinked", value.as_object().unwrap())
                .unwrap()
        })
        .collect();
    assert_eq!(types, vec![name!("Post"), name!("Page")]);
}

#[test]
fn relational_unions_discriminate_their_candidates() {
    let mut related = field("field_related", "related", FieldKind::Relationship);
    related.target_kinds = vec!["post".into(), "page".into()];
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![related])]).with_value(
            POST.to_string(),
            "field_related",
            json!([20, 30, 11]),
        ),
    );
    let context = context(provider, store());

    let related = resolve_post_field(&registry, &context, post(), "related");
    // the product is not a candidate kind
    assert_eq!(entity_ids(&related), vec![20, 11]);
    let types: Vec<_> = related
        .as_list()
        .unwrap()
        .iter()
        .map(|item| {
            registry
                .resolve_type("PostFieldsRelated", item.as_object().unwrap())
                .unwrap()
        })
        .collect();
    assert_eq!(types, vec![name!("Page"), name!("Post")]);

    let product = Source::Entity(content("product", 30));
    assert_eq!(
        registry.resolve_type("PostFieldsRelated", &product),
        Err(FieldError::UndiscriminatedEntity {
            abstract_type: "PostFieldsRelated".into(),
            kind: "content:product".into(),
        })
    );
}

#[test]
fn fallback_unions_only_resolve_members() {
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![field(
            "field_anything",
            "anything",
            FieldKind::Relationship,
        )])])
        .with_value(POST.to_string(), "field_anything", json!([20, 30])),
    );
    let context = context(provider, store());

    let anything = resolve_post_field(&registry, &context, post(), "anything");
    assert_eq!(entity_ids(&anything), vec![20]);
    let page = anything.as_list().unwrap()[0].as_object().unwrap().clone();
    assert_eq!(registry.resolve_type("PostObjectUnion", &page), Ok(name!("Page")));
    let product = Source::Entity(content("product", 30));
    assert!(registry.resolve_type("PostObjectUnion", &product).is_err());
}

#[test]
fn relational_fields_without_exposed_targets_resolve_empty() {
    let mut product = field("field_product", "product", FieldKind::PostObject);
    product.target_kinds = vec!["product".into()];
    let mut products = field("field_products", "products", FieldKind::Relationship);
    products.target_kinds = vec!["product".into()];
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![product, products])])
            .with_value(POST.to_string(), "field_product", 30)
            .with_value(POST.to_string(), "field_products", json!([30])),
    );
    let context = context(provider, store());

    assert!(resolve_post_field(&registry, &context, post(), "product").is_null());
    assert_eq!(
        resolve_post_field(&registry, &context, post(), "products"),
        ResolvedValue::List(vec![])
    );
}

#[test]
fn user_fields_exclude_private_users() {
    let mut authors = field("field_authors", "authors", FieldKind::User);
    authors.multiple = Some(true);
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![post_fields(vec![
            field("field_owner", "owner", FieldKind::User),
            field("field_hidden", "hidden", FieldKind::User),
            authors,
        ])])
        .with_value(POST.to_string(), "field_owner", 40)
        .with_value(POST.to_string(), "field_hidden", 41)
        .with_value(POST.to_string(), "field_authors", json!([41, 40])),
    );
    let context = context(provider, store());
    let resolve = |name| resolve_post_field(&registry, &context, post(), name);

    assert_eq!(resolve("owner").as_object().unwrap().as_entity().unwrap().id, 40);
    assert!(resolve("hidden").is_null());
    assert_eq!(entity_ids(&resolve("authors")), vec![40]);
}

#[test]
fn values_are_looked_up_by_entity_kind() {
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::new(vec![group(
            "group_extra",
            "Extra Fields",
            &["taxonomy:category", "user", "comment"],
            vec![field("field_note", "note", FieldKind::Text)],
        )])
        .with_value("term_1", "field_note", "category note")
        .with_value("user_40", "field_note", "user note")
        .with_value("comment_5", "field_note", "comment note"),
    );
    let context = context(provider, store());

    let cases = [
        ("Category", term("category", 1), "category note"),
        ("User", Entity::new(EntityKind::User, 40), "user note"),
        ("Comment", Entity::new(EntityKind::Comment, 5), "comment note"),
    ];
    for (entity_type, entity, expected) in cases {
        assert_eq!(
            resolve_group_field(
                &registry,
                &context,
                entity,
                (entity_type, "extraFields", "ExtraFields"),
                "note"
            ),
            ResolvedValue::leaf(expected)
        );
    }
}

#[test]
fn cloned_fields_read_the_original_key() {
    let mut clone = field("field_clone", "cloned", FieldKind::Text);
    clone.clone_of = Some("field_original".into());
    let (registry, provider) = compile_groups(
        MemoryConfigProvider::from_json(
            r#"{
                "field_groups": [],
                "values": { "12": { "field_original": "from the original" } }
            }"#,
        )
        .unwrap()
        .with_group(post_fields(vec![clone])),
    );
    let context = context(provider, store());
    assert_eq!(
        resolve_post_field(&registry, &context, post(), "cloned"),
        ResolvedValue::leaf("from the original")
    );
}

#[test]
fn field_group_config_requires_access() {
    let mut group = post_fields(vec![field("field_subtitle", "subtitle", FieldKind::Text)]);
    group.id = Some(7);
    let (registry, provider) = compile_groups(MemoryConfigProvider::new(vec![group]));

    let denied = context(provider.clone(), store());
    assert!(resolve_post_field(&registry, &denied, post(), "fieldGroupConfig").is_null());

    let allowed = context(provider, store()).with_access(Arc::new(AllowAll));
    let config = resolve_post_field(&registry, &allowed, post(), "fieldGroupConfig");
    let config = config.as_object().unwrap();
    assert_eq!(
        registry
            .resolve_field("AcfFieldGroupConfig", "title", config, &allowed)
            .unwrap(),
        ResolvedValue::leaf("Post Fields")
    );
    assert_eq!(
        registry
            .resolve_field("AcfFieldGroupConfig", "fieldNames", config, &allowed)
            .unwrap(),
        ResolvedValue::list([ResolvedValue::leaf("subtitle")])
    );
    assert_eq!(
        resolve_post_field(&registry, &denied, post(), "fieldGroupName"),
        ResolvedValue::leaf("postFields")
    );
}

#[test]
fn group_interfaces_discriminate_their_targets() {
    let (registry, _) = compile_groups(MemoryConfigProvider::new(vec![group(
        "group_shared",
        "Shared Fields",
        &["content:post", "content:page"],
        vec![field("field_note", "note", FieldKind::Text)],
    )]));

    assert_eq!(
        registry.resolve_type("HasSharedFields", &Source::Entity(content("page", 20))),
        Ok(name!("Page"))
    );
    assert!(
        registry
            .resolve_type("HasSharedFields", &Source::Entity(Entity::new(EntityKind::User, 40)))
            .is_err()
    );
}
