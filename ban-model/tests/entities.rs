//! Tests d'intégration sur des réponses réelles de l'API (fixtures JSON)

use ban_model::{AddressEntity, AddressKind, ModelError, ViewModel, ViewportCommand, ViewportSync};

fn load(name: &str) -> AddressEntity {
    let path = format!("{}/tests/fixtures/{}.json", env!("CARGO_MANIFEST_DIR"), name);
    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    AddressEntity::from_json(value).unwrap()
}

#[test]
fn test_commune_fixture() {
    let entity = load("commune");
    assert_eq!(entity.kind(), AddressKind::Commune);
    assert_eq!(entity.id(), "38185");

    let view = ViewModel::from_entity(&entity);
    assert_eq!(view.title, "Grenoble (38185)");
    assert_eq!(
        view.description,
        "Grenoble : 1042 voies répertoriées, 21134 numéros répertoriés"
    );
    assert_eq!(
        view.location.as_deref(),
        Some("Auvergne-Rhône-Alpes - Isère (38)")
    );
    assert_eq!(view.page_title(), "Grenoble (38185) - Base Adresse Nationale");

    match &entity {
        AddressEntity::Commune(c) => assert_eq!(c.voies.len(), 2),
        other => panic!("unexpected {:?}", other.kind()),
    }
}

#[test]
fn test_voie_fixture() {
    let entity = load("voie");
    assert_eq!(entity.kind(), AddressKind::Voie);
    assert!(!entity.is_toponym());
    assert_eq!(entity.commune_code(), "38185");

    let view = ViewModel::from_entity(&entity);
    assert_eq!(view.title, "Rue Abbé Grégoire, Grenoble (38185)");
    assert_eq!(
        view.description,
        "Rue Abbé Grégoire, voie de la commune de Grenoble : 1 numéro répertorié"
    );

    match &entity {
        AddressEntity::Voie(v) => {
            assert_eq!(v.numeros.len(), 1);
            assert_eq!(v.numeros[0].label(), "12bis");
        }
        other => panic!("unexpected {:?}", other.kind()),
    }
}

#[test]
fn test_lieu_dit_fixture() {
    let entity = load("lieu-dit");
    assert_eq!(entity.kind(), AddressKind::LieuDit);
    assert!(entity.is_toponym());

    let view = ViewModel::from_entity(&entity);
    assert_eq!(view.title, "Les Granges, Grenoble (38185)");
    assert_eq!(view.description, "Les Granges, lieu-dit de la commune de Grenoble");
    // Ni région ni département dans la fixture
    assert_eq!(view.location, None);
}

#[test]
fn test_numero_fixture() {
    let entity = load("numero");
    assert_eq!(entity.kind(), AddressKind::Numero);

    let view = ViewModel::from_entity(&entity);
    assert_eq!(view.title, "12bis Rue Abbé Grégoire, Grenoble (38185)");
    assert_eq!(
        view.description,
        "Numéro 12bis Rue Abbé Grégoire, à Grenoble (38185)"
    );

    match &entity {
        AddressEntity::Numero(n) => {
            assert_eq!(n.coordinates(), Some((5.7245241, 45.188529)));
            assert_eq!(n.parcelles, vec!["38185000AB0123".to_string()]);
            assert_eq!(n.code_postal.as_deref(), Some("38000"));
        }
        other => panic!("unexpected {:?}", other.kind()),
    }
}

#[test]
fn test_titles_contain_defining_identifier() {
    for name in ["commune", "voie", "lieu-dit", "numero"] {
        let entity = load(name);
        let view = ViewModel::from_entity(&entity);
        let defining = match &entity {
            AddressEntity::Commune(c) => c.nom_commune.clone(),
            AddressEntity::Voie(v) => v.nom_voie.clone(),
            AddressEntity::LieuDit(l) => l.nom_voie.clone(),
            AddressEntity::Numero(n) => n.label(),
        };
        assert!(view.title.contains(&defining), "{}: {}", name, view.title);
    }
}

#[test]
fn test_unknown_type_is_rejected() {
    let value = serde_json::json!({ "type": "parcelle", "id": "38185000AB0123" });
    assert!(matches!(
        AddressEntity::from_json(value),
        Err(ModelError::UnknownKind(tag)) if tag == "parcelle"
    ));
}

#[test]
fn test_numero_with_polygon_position_is_rejected() {
    let mut value: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(format!(
            "{}/tests/fixtures/numero.json",
            env!("CARGO_MANIFEST_DIR")
        ))
        .unwrap(),
    )
    .unwrap();
    value["position"] = serde_json::json!({
        "type": "Polygon",
        "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
    });

    assert!(matches!(
        AddressEntity::from_json(value),
        Err(ModelError::InvalidGeometry { .. })
    ));
}

#[test]
fn test_viewport_follows_entities() {
    let mut sync = ViewportSync::new();

    // Commune : contour
    sync.track(Some(&load("commune")));
    let bounds = sync.bounds().unwrap();
    assert_eq!(bounds.min_lon, 5.678);
    assert_eq!(bounds.max_lat, 45.214);
    assert!(matches!(sync.next_command(), ViewportCommand::Fit(_)));

    // Voie : pas de géométrie, repli sur displayBBox
    sync.track(Some(&load("voie")));
    assert_eq!(sync.bounds().unwrap().min_lon, 5.7201);

    // Lieu-dit sans géométrie ni bbox : vue conservée
    sync.track(Some(&load("lieu-dit")));
    assert_eq!(sync.bounds(), None);
    assert_eq!(sync.next_command(), ViewportCommand::Retain);

    // Numéro : point, emprise dégénérée
    sync.track(Some(&load("numero")));
    let bounds = sync.bounds().unwrap();
    assert_eq!(bounds.min_lon, bounds.max_lon);
    assert_eq!(sync.recomputations(), 4);
}
