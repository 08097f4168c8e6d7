use kiln_core::{is_valid_class_name, to_class_file_path, to_logical_name, to_staging_path};
use proptest::prelude::*;

fn class_name() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z_$][A-Za-z0-9_$]{0,12}", 1..6).prop_map(|parts| parts.join("."))
}

proptest! {
    #[test]
    fn staging_path_round_trips(name in class_name()) {
        prop_assert!(is_valid_class_name(&name));
        prop_assert_eq!(to_logical_name(&to_staging_path(&name)), name);
    }

    #[test]
    fn class_file_path_round_trips(name in class_name()) {
        prop_assert_eq!(to_logical_name(&to_class_file_path(&name)), name.clone());
        prop_assert_eq!(to_logical_name(&format!("./{}", to_class_file_path(&name))), name);
    }

    #[test]
    fn distinct_names_get_distinct_staging_paths(a in class_name(), b in class_name()) {
        prop_assume!(a != b);
        prop_assert_ne!(to_staging_path(&a), to_staging_path(&b));
    }
}

#[test]
fn rest_resource_example() {
    let staged = to_staging_path("org.kie.gen.HelloResource");
    assert_eq!(staged, "src/main/java/org/kie/gen/HelloResource.java");
    assert_eq!(to_logical_name(&staged), "org.kie.gen.HelloResource");
}
