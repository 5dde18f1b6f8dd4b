/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Arithmetic over `.size`/`.value` expressions, resolved against a finished
//! symbol table (driver pass 8).

use crate::ast::Expr;
use crate::assembler::symbol_table::SymbolTable;
use crate::errors::AssemblyError;

pub fn evaluate(expr: &Expr, symbols: &SymbolTable) -> Result<i64, AssemblyError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Label(name) => symbols
            .get(name)
            .map(|entry| entry.address as i64)
            .ok_or_else(|| AssemblyError::symbol(format!("unresolvable label `{}` in expression", name))),
        Expr::Add(a, b) => Ok(evaluate(a, symbols)?.wrapping_add(evaluate(b, symbols)?)),
        Expr::Sub(a, b) => Ok(evaluate(a, symbols)?.wrapping_sub(evaluate(b, symbols)?)),
        Expr::Mul(a, b) => Ok(evaluate(a, symbols)?.wrapping_mul(evaluate(b, symbols)?)),
        Expr::Div(a, b) => {
            let divisor = evaluate(b, symbols)?;
            if divisor == 0 {
                return Err(AssemblyError::symbol("division by zero in expression"));
            }
            Ok(evaluate(a, symbols)?.wrapping_div(divisor))
        }
        Expr::Neg(a) => Ok(-evaluate(a, symbols)?),
    }
}

/// Walks an expression purely for its label references, without requiring
/// them to be resolvable yet. Used by `findAllLabels` (driver pass 2).
pub fn collect_labels(expr: &Expr, out: &mut std::collections::HashSet<String>) {
    match expr {
        Expr::Number(_) => {}
        Expr::Label(name) => {
            out.insert(name.clone());
        }
        Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) => {
            collect_labels(a, out);
            collect_labels(b, out);
        }
        Expr::Neg(a) => collect_labels(a, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::symbol_table::SymbolType;

    #[test]
    fn number_evaluates_to_itself() {
        let symbols = SymbolTable::new();
        assert_eq!(evaluate(&Expr::Number(42), &symbols).unwrap(), 42);
    }

    #[test]
    fn label_resolves_to_address() {
        let mut symbols = SymbolTable::new();
        symbols.insert("foo", SymbolType::Code, 0x100).unwrap();
        assert_eq!(evaluate(&Expr::Label("foo".to_string()), &symbols).unwrap(), 0x100);
    }

    #[test]
    fn unknown_label_is_symbol_error() {
        let symbols = SymbolTable::new();
        assert!(evaluate(&Expr::Label("missing".to_string()), &symbols).is_err());
    }

    #[test]
    fn arithmetic_combines_subexpressions() {
        let mut symbols = SymbolTable::new();
        symbols.insert("foo", SymbolType::Data, 100).unwrap();
        let expr = Expr::Add(
            Box::new(Expr::Label("foo".to_string())),
            Box::new(Expr::Mul(Box::new(Expr::Number(2)), Box::new(Expr::Number(3)))),
        );
        assert_eq!(evaluate(&expr, &symbols).unwrap(), 106);
    }

    #[test]
    fn division_by_zero_is_symbol_error() {
        let symbols = SymbolTable::new();
        let expr = Expr::Div(Box::new(Expr::Number(1)), Box::new(Expr::Number(0)));
        assert!(evaluate(&expr, &symbols).is_err());
    }

    #[test]
    fn collect_labels_walks_nested_expression() {
        let expr = Expr::Sub(
            Box::new(Expr::Label("end".to_string())),
            Box::new(Expr::Label("start".to_string())),
        );
        let mut out = std::collections::HashSet::new();
        collect_labels(&expr, &mut out);
        assert!(out.contains("end") && out.contains("start"));
    }
}
