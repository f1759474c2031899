//! The shipped catalog and the engine's skill table must agree exactly.

use battle_content::CatalogLoader;
use battle_core::{Element, NON_COMBAT_SKILLS, SkillId, Trigger};
use strum::IntoEnumIterator;

#[test]
fn shipped_catalog_passes_the_completeness_audit() {
    let catalog = CatalogLoader::embedded().expect("embedded catalog parses");
    let report = catalog.audit();

    assert!(report.unresolved.is_empty(), "unresolved names: {:?}", report.unresolved);
    assert!(report.unreachable.is_empty(), "unreachable skills: {:?}", report.unreachable);
    assert!(report.unadvertised.is_empty(), "unadvertised skills: {:?}", report.unadvertised);
}

#[test]
fn every_skill_and_exception_is_advertised_once() {
    let catalog = CatalogLoader::embedded().unwrap();
    let names: Vec<&str> = catalog.names().collect();

    assert_eq!(names.len(), SkillId::iter().count() + NON_COMBAT_SKILLS.len());
    for id in SkillId::iter() {
        let hits = names.iter().filter(|name| SkillId::from_name(name) == Some(id)).count();
        assert_eq!(hits, 1, "{} advertised {hits} times", id.name());
    }
}

#[test]
fn every_skill_has_a_trigger() {
    for id in SkillId::iter() {
        assert!(
            Trigger::iter().any(|trigger| id.runs_on(trigger)),
            "{} never runs",
            id.name()
        );
    }
}

#[test]
fn elements_group_their_signature_skills() {
    let catalog = CatalogLoader::embedded().unwrap();
    assert_eq!(catalog.element_of("Flame Burst"), Some(Element::Fire));
    assert_eq!(catalog.element_of("Holy Strike"), Some(Element::Light));
    assert_eq!(catalog.element_of("Treasure Sense"), Some(Element::Dark));
    assert_eq!(catalog.element_of("Iron Will"), Some(Element::Corrupted));
}

#[test]
fn a_catalog_with_a_typo_fails_the_audit() {
    let mut catalog = CatalogLoader::embedded().unwrap();
    catalog.groups[0].skills[0] = "Flame Brust".to_string();
    let report = catalog.audit();

    assert_eq!(report.unresolved, vec!["Flame Brust".to_string()]);
    assert_eq!(report.unadvertised, vec![SkillId::FlameBurst]);
}
