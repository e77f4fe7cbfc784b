//! Validate command: check a string against the identifier grammar.

use console::style;

use crate::{Result, error::Error, ident::Identifier};

/// Executes the validate command.
pub fn execute(input: String, json: bool) -> Result<()> {
   let valid = Identifier::validate_format(&input);

   if json {
      println!(
         "{}",
         serde_json::json!({ "identifier": input, "valid": valid })
      );
      if !valid {
         let code = Error::MalformedIdentifier { input }.exit_code();
         return Err(Error::Reported {
            message:   "identifier validation failed".to_string(),
            exit_code: code,
         });
      }
      return Ok(());
   }

   if valid {
      println!("{}", style(format!("✓ {input} is a valid identifier")).green());
      return Ok(());
   }

   println!("{}", style(format!("✗ {input} is not a valid identifier")).red());
   println!("  expected shape: mal:(anime|manga):<positive integer, no leading zeros>");
   let code = Error::MalformedIdentifier { input }.exit_code();
   Err(Error::Reported {
      message:   "identifier validation failed".to_string(),
      exit_code: code,
   })
}
