// crates/scl-template-import/tests/import_scenarios.rs

//! End-to-end imports of template IEDs into project documents.

use scl_template_import::{
    Document, DocumentHost, EditHost, ImportOptions, ImportQuantity, ImportRequest, NodeId,
    Template, TypeKind, import_into_document, import_templates,
};

const TEST_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SCL xmlns="http://www.iec.ch/61850/2003/SCL" xmlns:vnd="http://testman/ext" version="2007" revision="B" release="4">
  <Header id="TestTemplate"/>
  <Communication>
    <SubNetwork name="StationBus" type="8-MMS">
      <BitRate unit="b/s" multiplier="M">100</BitRate>
      <ConnectedAP iedName="TEMPLATE" apName="AP1">
        <Address>
          <P type="IP">192.168.0.10</P>
        </Address>
        <GSE ldInst="CTRL" cbName="gcb01">
          <Address>
            <P type="MAC-Address">01-0C-CD-01-00-01</P>
          </Address>
        </GSE>
      </ConnectedAP>
    </SubNetwork>
  </Communication>
  <IED name="TEMPLATE" manufacturer="TestMan" type="TestType" desc="Test relay" configVersion="1.0">
    <AccessPoint name="AP1">
      <Server>
        <Authentication/>
        <LDevice inst="CTRL">
          <LN0 lnClass="LLN0" inst="" lnType="TestLLN0"/>
          <LN lnClass="XCBR" inst="1" lnType="TestXCBR"/>
        </LDevice>
      </Server>
    </AccessPoint>
  </IED>
  <DataTypeTemplates>
    <LNodeType id="TestLLN0" lnClass="LLN0">
      <DO name="Beh" type="TestENS_Beh"/>
    </LNodeType>
    <LNodeType id="TestXCBR" lnClass="XCBR">
      <DO name="Beh" type="TestENS_Beh"/>
      <DO name="Pos" type="TestDPC"/>
    </LNodeType>
    <LNodeType id="TestUnusedLN" lnClass="GGIO"/>
    <DOType id="TestENS_Beh" cdc="ENS">
      <DA name="stVal" bType="Enum" fc="ST" type="BehaviourModeKind"/>
    </DOType>
    <DOType id="TestDPC" cdc="DPC">
      <DA name="stVal" bType="Dbpos" fc="ST"/>
      <DA name="origin" bType="Struct" fc="ST" type="TestOriginator"/>
    </DOType>
    <DAType id="TestOriginator">
      <BDA name="orCat" bType="Enum" type="orCategory"/>
    </DAType>
    <EnumType id="BehaviourModeKind">
      <EnumVal ord="1">on</EnumVal>
      <EnumVal ord="5">off</EnumVal>
    </EnumType>
    <EnumType id="orCategory">
      <EnumVal ord="0">not-supported</EnumVal>
      <EnumVal ord="1">bay-control</EnumVal>
    </EnumType>
    <EnumType id="TestUnusedEnum">
      <EnumVal ord="0">unused</EnumVal>
    </EnumType>
  </DataTypeTemplates>
</SCL>"#;

const OTHER_TEMPLATE: &str = r#"<SCL xmlns="http://www.iec.ch/61850/2003/SCL">
  <Communication>
    <SubNetwork name="StationBus" type="8-MMS">
      <ConnectedAP iedName="TEMPLATE" apName="P1"/>
    </SubNetwork>
  </Communication>
  <IED name="TEMPLATE" manufacturer="Other Inc." type="Bay-Ctl">
    <AccessPoint name="P1">
      <Server>
        <Authentication/>
        <LDevice inst="LD0">
          <LN0 lnClass="LLN0" inst="" lnType="TestLLN0"/>
        </LDevice>
      </Server>
    </AccessPoint>
  </IED>
  <DataTypeTemplates>
    <LNodeType id="TestLLN0" lnClass="LLN0">
      <DO name="Beh" type="TestENS_Beh"/>
    </LNodeType>
    <DOType id="TestENS_Beh" cdc="ENS">
      <DA name="stVal" bType="Enum" fc="ST" type="BehaviourModeKind"/>
    </DOType>
    <EnumType id="BehaviourModeKind">
      <EnumVal ord="1">on</EnumVal>
      <EnumVal ord="5">off</EnumVal>
    </EnumType>
  </DataTypeTemplates>
</SCL>"#;

const EMPTY_PROJECT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SCL xmlns="http://www.iec.ch/61850/2003/SCL" version="2007" revision="B" release="4">
  <Header id="Project"/>
</SCL>"#;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn template(xml: &str, name: &str) -> Template {
    Template::parse(xml, name).expect("template should be valid")
}

fn request(xml: &str, name: &str, quantity: u32) -> ImportRequest {
    ImportRequest::new(
        template(xml, name),
        ImportQuantity::new(quantity).expect("quantity in range"),
    )
}

fn no_comms() -> ImportOptions {
    ImportOptions {
        include_comms_addresses: false,
    }
}

fn ied_names(doc: &Document) -> Vec<&str> {
    doc.children_named(doc.root(), "IED")
        .filter_map(|ied| doc.attribute(ied, "name"))
        .collect()
}

fn all(doc: &Document, tag: &str) -> Vec<NodeId> {
    doc.descendants_named(doc.root(), tag)
}

fn type_ids(doc: &Document, tag: &str) -> Vec<String> {
    all(doc, tag)
        .into_iter()
        .filter_map(|t| doc.attribute(t, "id").map(str::to_string))
        .collect()
}

#[test]
fn test_scenario_a_import_with_communication() {
    init_logger();
    let mut doc = Document::parse(EMPTY_PROJECT).unwrap();
    let report = import_into_document(
        &mut doc,
        &[request(TEST_TEMPLATE, "test.icd", 1)],
        ImportOptions::default(),
    )
    .unwrap();

    assert_eq!(ied_names(&doc), ["TestMan_TestType_01"]);
    assert_eq!(report.imported[0].name, "TestMan_TestType_01");
    assert_eq!(all(&doc, "Communication").len(), 1);
    let aps = all(&doc, "ConnectedAP");
    assert_eq!(aps.len(), 1);
    assert_eq!(doc.attribute(aps[0], "iedName"), Some("TestMan_TestType_01"));
    // The access point keeps its addresses.
    assert_eq!(doc.descendants_named(aps[0], "GSE").len(), 1);

    let root_children: Vec<_> = doc.child_elements(doc.root()).map(|c| doc.name(c)).collect();
    assert_eq!(
        root_children,
        ["Header", "Communication", "IED", "DataTypeTemplates"]
    );
    assert_eq!(
        doc.attribute(doc.root(), "xmlns:vnd"),
        Some("http://testman/ext")
    );
}

#[test]
fn test_scenario_b_import_without_communication() {
    init_logger();
    let mut doc = Document::parse(EMPTY_PROJECT).unwrap();
    import_into_document(&mut doc, &[request(TEST_TEMPLATE, "test.icd", 1)], no_comms()).unwrap();

    assert_eq!(ied_names(&doc), ["TestMan_TestType_01"]);
    assert!(all(&doc, "Communication").is_empty());
    assert!(all(&doc, "ConnectedAP").is_empty());
}

#[test]
fn test_scenario_c_two_instances_of_one_template() {
    init_logger();
    let mut doc = Document::parse(EMPTY_PROJECT).unwrap();
    import_into_document(
        &mut doc,
        &[request(TEST_TEMPLATE, "test.icd", 2)],
        ImportOptions::default(),
    )
    .unwrap();

    assert_eq!(ied_names(&doc), ["TestMan_TestType_01", "TestMan_TestType_02"]);
    assert_eq!(all(&doc, "Communication").len(), 1);
    assert_eq!(all(&doc, "SubNetwork").len(), 1);
    let ap_owners: Vec<_> = all(&doc, "ConnectedAP")
        .into_iter()
        .filter_map(|ap| doc.attribute(ap, "iedName"))
        .collect();
    assert_eq!(ap_owners, ["TestMan_TestType_01", "TestMan_TestType_02"]);

    // The second instance reuses every data type of the first.
    assert_eq!(type_ids(&doc, "LNodeType"), ["TestLLN0", "TestXCBR"]);
    assert_eq!(type_ids(&doc, "DOType"), ["TestENS_Beh", "TestDPC"]);
    assert_eq!(type_ids(&doc, "DAType"), ["TestOriginator"]);
    assert_eq!(type_ids(&doc, "EnumType"), ["BehaviourModeKind", "orCategory"]);
}

#[test]
fn test_scenario_d_two_templates() {
    init_logger();
    let mut doc = Document::parse(EMPTY_PROJECT).unwrap();
    let report = import_into_document(
        &mut doc,
        &[
            request(TEST_TEMPLATE, "test.icd", 1),
            request(OTHER_TEMPLATE, "other.icd", 1),
        ],
        ImportOptions::default(),
    )
    .unwrap();

    assert_eq!(ied_names(&doc), ["TestMan_TestType_01", "OtherInc_BayCtl_01"]);
    assert_eq!(all(&doc, "Communication").len(), 1);
    assert_eq!(all(&doc, "SubNetwork").len(), 1);
    assert_eq!(all(&doc, "ConnectedAP").len(), 2);
    // Shared types are identical in both templates and are not renamed.
    assert!(report.imported.iter().all(|ied| ied.renamed_types.is_empty()));
}

#[test]
fn test_default_names_count_up() {
    init_logger();
    let xml = TEST_TEMPLATE
        .replace(r#" manufacturer="TestMan" type="TestType""#, "");
    let mut doc = Document::parse(EMPTY_PROJECT).unwrap();
    import_into_document(&mut doc, &[request(&xml, "plain.icd", 3)], no_comms()).unwrap();
    assert_eq!(
        ied_names(&doc),
        ["TEMPLATE_IED_01", "TEMPLATE_IED_02", "TEMPLATE_IED_03"]
    );
}

#[test]
fn test_unreachable_types_are_never_inserted() {
    let mut doc = Document::parse(EMPTY_PROJECT).unwrap();
    import_into_document(&mut doc, &[request(TEST_TEMPLATE, "test.icd", 1)], no_comms()).unwrap();
    assert!(!type_ids(&doc, "LNodeType").contains(&"TestUnusedLN".to_string()));
    assert!(!type_ids(&doc, "EnumType").contains(&"TestUnusedEnum".to_string()));
}

#[test]
fn test_identical_types_in_project_are_reused() {
    init_logger();
    let mut doc = Document::parse(EMPTY_PROJECT).unwrap();
    import_into_document(&mut doc, &[request(TEST_TEMPLATE, "test.icd", 1)], no_comms()).unwrap();
    let before = type_ids(&doc, "EnumType").len();

    // A later import of the same template adds only the IED.
    let template = template(TEST_TEMPLATE, "test.icd");
    let mut import = scl_template_import::TemplateImport::new(
        &template,
        ImportQuantity::default(),
        no_comms(),
    );
    let batch = import.next_batch(&mut doc).unwrap().unwrap();
    assert_eq!(batch.edits.len(), 1);
    assert_eq!(batch.edits[0].node.name, "IED");
    doc.apply_batch(&batch).unwrap();
    assert_eq!(type_ids(&doc, "EnumType").len(), before);
}

const CONFLICTING_PROJECT: &str = r#"<SCL xmlns="http://www.iec.ch/61850/2003/SCL">
  <Header id="Project"/>
  <IED name="Existing"/>
  <DataTypeTemplates>
    <LNodeType id="TestLLN0" lnClass="LLN0">
      <DO name="Beh" type="TestENS_Beh"/>
    </LNodeType>
    <DOType id="TestENS_Beh" cdc="ENS">
      <DA name="stVal" bType="Enum" fc="ST" type="BehaviourModeKind"/>
    </DOType>
    <EnumType id="BehaviourModeKind">
      <EnumVal ord="1">on</EnumVal>
    </EnumType>
  </DataTypeTemplates>
</SCL>"#;

#[test]
fn test_colliding_types_are_renamed_with_references() {
    init_logger();
    let mut doc = Document::parse(CONFLICTING_PROJECT).unwrap();
    let report =
        import_into_document(&mut doc, &[request(TEST_TEMPLATE, "test.icd", 1)], no_comms())
            .unwrap();

    let renamed: Vec<_> = report.imported[0]
        .renamed_types
        .iter()
        .map(|r| (r.kind, r.new_id.as_str()))
        .collect();
    assert_eq!(
        renamed,
        [
            (TypeKind::EnumType, "TestMan_TestType_01BehaviourModeKind"),
            (TypeKind::DoType, "TestMan_TestType_01TestENS_Beh"),
            (TypeKind::LNodeType, "TestMan_TestType_01TestLLN0"),
        ]
    );

    // The project's own definitions are untouched.
    let enum_ids = type_ids(&doc, "EnumType");
    assert_eq!(enum_ids[0], "BehaviourModeKind");
    assert!(enum_ids.contains(&"TestMan_TestType_01BehaviourModeKind".to_string()));

    // Every reference inside the new IED resolves to a definition.
    let ied = doc
        .children_named(doc.root(), "IED")
        .find(|ied| doc.attribute(*ied, "name") == Some("TestMan_TestType_01"))
        .unwrap();
    let ln_types: Vec<_> = doc
        .descendants_named(ied, "LN0")
        .into_iter()
        .chain(doc.descendants_named(ied, "LN"))
        .filter_map(|ln| doc.attribute(ln, "lnType"))
        .collect();
    assert_eq!(ln_types, ["TestMan_TestType_01TestLLN0", "TestXCBR"]);
    let lnode_ids = type_ids(&doc, "LNodeType");
    assert!(ln_types.iter().all(|t| lnode_ids.iter().any(|id| id == t)));

    // The XCBR type keeps its id but points at the renamed DOType.
    let xcbr = all(&doc, "LNodeType")
        .into_iter()
        .find(|t| doc.attribute(*t, "id") == Some("TestXCBR"))
        .unwrap();
    let beh = doc.child_named(xcbr, "DO").unwrap();
    assert_eq!(
        doc.attribute(beh, "type"),
        Some("TestMan_TestType_01TestENS_Beh")
    );
}

#[test]
fn test_renaming_is_deterministic() {
    let run = || {
        let mut doc = Document::parse(CONFLICTING_PROJECT).unwrap();
        import_into_document(&mut doc, &[request(TEST_TEMPLATE, "test.icd", 2)], no_comms())
            .unwrap();
        doc.to_xml_string().unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_template_is_reusable_across_runs() {
    let template = template(TEST_TEMPLATE, "test.icd");
    let batch_for_fresh_project = || {
        let mut doc = Document::parse(EMPTY_PROJECT).unwrap();
        let mut import = scl_template_import::TemplateImport::new(
            &template,
            ImportQuantity::default(),
            ImportOptions::default(),
        );
        import.next_batch(&mut doc).unwrap().unwrap()
    };
    assert_eq!(batch_for_fresh_project(), batch_for_fresh_project());
    assert_eq!(template.ied().attribute("name"), Some("TEMPLATE"));
}

#[test]
fn test_connected_aps_join_existing_sub_network() {
    let project = r#"<SCL>
  <Communication>
    <SubNetwork name="StationBus" type="8-MMS">
      <ConnectedAP iedName="Existing" apName="AP1"/>
    </SubNetwork>
  </Communication>
  <IED name="Existing"/>
</SCL>"#;
    let mut doc = Document::parse(project).unwrap();
    import_into_document(
        &mut doc,
        &[request(TEST_TEMPLATE, "test.icd", 1)],
        ImportOptions::default(),
    )
    .unwrap();

    let sub_networks = all(&doc, "SubNetwork");
    assert_eq!(sub_networks.len(), 1);
    let owners: Vec<_> = doc
        .children_named(sub_networks[0], "ConnectedAP")
        .filter_map(|ap| doc.attribute(ap, "iedName"))
        .collect();
    assert_eq!(owners, ["Existing", "TestMan_TestType_01"]);
}

#[test]
fn test_private_ieds_do_not_block_names() {
    let project = r#"<SCL>
  <Private type="history">
    <IED name="TestMan_TestType_01"/>
  </Private>
</SCL>"#;
    let mut doc = Document::parse(project).unwrap();
    import_into_document(&mut doc, &[request(TEST_TEMPLATE, "test.icd", 1)], no_comms()).unwrap();
    assert_eq!(ied_names(&doc), ["TestMan_TestType_01"]);
}

#[test]
fn test_merged_project_survives_serialization() {
    let mut doc = Document::parse(EMPTY_PROJECT).unwrap();
    import_into_document(
        &mut doc,
        &[request(TEST_TEMPLATE, "test.icd", 2)],
        ImportOptions::default(),
    )
    .unwrap();
    let xml = doc.to_xml_string().unwrap();
    assert!(xml.starts_with("<?xml"));
    let reparsed = Document::parse(&xml).unwrap();
    assert_eq!(
        reparsed.to_element(reparsed.root()),
        doc.to_element(doc.root())
    );
}

#[tokio::test]
async fn test_async_driver_matches_sync_driver() {
    init_logger();
    let requests = [
        request(TEST_TEMPLATE, "test.icd", 2),
        request(OTHER_TEMPLATE, "other.icd", 0),
        request(OTHER_TEMPLATE, "other.icd", 1),
    ];

    let mut host = DocumentHost::new(Document::parse(CONFLICTING_PROJECT).unwrap());
    let async_report = import_templates(&mut host, &requests, ImportOptions::default())
        .await
        .unwrap();

    let mut doc = Document::parse(CONFLICTING_PROJECT).unwrap();
    let sync_report = import_into_document(&mut doc, &requests, ImportOptions::default()).unwrap();

    assert_eq!(async_report, sync_report);
    assert_eq!(
        host.document().to_xml_string().unwrap(),
        doc.to_xml_string().unwrap()
    );
    assert_eq!(
        ied_names(host.document()),
        [
            "Existing",
            "TestMan_TestType_01",
            "TestMan_TestType_02",
            "OtherInc_BayCtl_01"
        ]
    );
}
