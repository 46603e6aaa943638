//! Deferred-commit form example: edits buffer locally until OK, or are
//! discarded on Cancel.

use std::sync::Arc;
use tether::value::{BufferedValue, Trigger, ValueHolder, ValueModel};

fn main() {
    println!("=== Buffered Form Example ===\n");

    let name = Arc::new(ValueHolder::new("Ada".to_string()));
    let email = Arc::new(ValueHolder::new("ada@example.com".to_string()));

    // One trigger gates the whole dialog
    let apply = Arc::new(Trigger::new());
    let name_field = BufferedValue::new(name.clone() as Arc<dyn ValueModel<String>>, apply.clone());
    let email_field =
        BufferedValue::new(email.clone() as Arc<dyn ValueModel<String>>, apply.clone());

    println!("Typing into both fields...");
    name_field.set_value(Some("Grace".to_string()));
    email_field.set_value(Some("grace@example.com".to_string()));
    println!("Model still says name = {:?}", name.value());

    println!("\nPressing OK...");
    apply.trigger_commit();
    println!("Model now says name = {:?}", name.value());
    println!("Model now says email = {:?}", email.value());

    println!("\nEditing again, then pressing Cancel...");
    name_field.set_value(Some("Zzz".to_string()));
    apply.trigger_flush();
    println!("Model kept name = {:?}", name.value());
}
