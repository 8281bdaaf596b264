//! Normalización de módulos y rol de administrador
//!
//! El servicio de login devuelve los módulos autorizados bajo nombres de
//! clave variables y con formas no uniformes. Aquí se reducen a un conjunto
//! de identificadores en minúsculas, y el rol de administrador se infiere
//! con una tabla de reglas ordenada. Las reglas son heurísticas: el
//! servicio de login no documenta su contrato.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::list::filter::fold;
use crate::list::normalize::value_to_text;

/// Claves donde pueden venir los módulos
pub const MODULE_KEYS: [&str; 12] = [
    "modulos", "modules", "MODULOS", "MODULES", "Modulos", "permisos", "PERMISOS",
    "permissions", "accesos", "ACCESOS", "menus", "MENUS",
];

/// Claves del nombre de un módulo cuando viene como objeto
pub const MODULE_NAME_KEYS: [&str; 10] = [
    "NOMBRE", "nombre", "name", "NAME", "modulo", "MODULO", "id", "ID", "codigo", "CODIGO",
];

/// Objetos donde se anidan los datos del usuario
const NESTED_KEYS: [&str; 3] = ["user", "usuario", "data"];

const ROLE_KEYS: [&str; 6] = ["rol", "role", "ROL", "ROLE", "id_rol", "ID_ROL"];

const USERNAME_KEYS: [&str; 6] = ["usuario", "username", "USUARIO", "user", "nombre", "NOMBRE"];

/// Lo que produce un objeto sin nombre reconocible al convertirse a texto
const DEGRADED_OBJECT: &str = "[object object]";

/// Reglas para inferir el rol de administrador, en orden de evaluación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRule {
    /// Rol numérico igual a 1
    NumericRoleOne,
    /// Rol textual que contiene "admin"
    RoleNameContainsAdmin,
    /// Usuario que contiene un alias de administrador conocido
    UsernameIsAdminAlias,
    /// Sin módulos asignados se asume acceso completo
    NoModules,
}

impl AdminRule {
    pub const ORDER: [AdminRule; 4] = [
        AdminRule::NumericRoleOne,
        AdminRule::RoleNameContainsAdmin,
        AdminRule::UsernameIsAdminAlias,
        AdminRule::NoModules,
    ];

    fn applies(&self, facts: &LoginFacts<'_>) -> bool {
        match self {
            AdminRule::NumericRoleOne => facts.role.map_or(false, |role| match role {
                Value::Number(n) => n.as_f64() == Some(1.0),
                Value::String(s) => s.trim() == "1",
                _ => false,
            }),
            AdminRule::RoleNameContainsAdmin => facts
                .role
                .and_then(|role| role.as_str())
                .map_or(false, |role| fold(role).contains("admin")),
            AdminRule::UsernameIsAdminAlias => facts.username.as_deref().map_or(false, |user| {
                let user = fold(user);
                facts
                    .admin_aliases
                    .iter()
                    .map(|alias| fold(alias.trim()))
                    .any(|alias| !alias.is_empty() && user.contains(&alias))
            }),
            AdminRule::NoModules => facts.modules.is_empty(),
        }
    }
}

/// Resultado de la inferencia, con la regla que decidió
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminDecision {
    pub is_admin: bool,
    pub matched: Option<AdminRule>,
}

struct LoginFacts<'a> {
    role: Option<&'a Value>,
    username: Option<String>,
    modules: &'a [String],
    admin_aliases: &'a [String],
}

/// Evaluar la tabla de reglas; la primera que aplica decide
pub fn infer_admin(payload: &Value, modules: &[String], admin_aliases: &[String]) -> AdminDecision {
    let facts = LoginFacts {
        role: find_key(payload, &ROLE_KEYS),
        username: find_key(payload, &USERNAME_KEYS).and_then(value_to_text),
        modules,
        admin_aliases,
    };

    let matched = AdminRule::ORDER.into_iter().find(|rule| rule.applies(&facts));
    AdminDecision {
        is_admin: matched.is_some(),
        matched,
    }
}

/// Extraer los módulos autorizados del payload de login
pub fn extract_modules(payload: &Value) -> Vec<String> {
    let mut modules: Vec<String> = Vec::new();
    for object in candidate_objects(payload) {
        for key in MODULE_KEYS {
            if let Some(value) = object.get(key) {
                collect_modules(value, &mut modules);
            }
        }
    }
    modules
}

fn collect_modules(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                if let Some(name) = module_name(item) {
                    push_unique(out, name);
                }
            }
        }
        // "ventas, cajas,permisos"
        Value::String(list) => {
            for name in list.split(',') {
                push_unique(out, name.to_string());
            }
        }
        _ => {}
    }
}

/// Nombre de un módulo; `None` si el elemento no es utilizable
pub fn module_name(item: &Value) -> Option<String> {
    let raw = match item {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => MODULE_NAME_KEYS
            .iter()
            .filter_map(|key| map.get(*key).and_then(value_to_text))
            .find(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEGRADED_OBJECT.to_string()),
        _ => return None,
    };

    let name = raw.trim().to_lowercase();
    if name.is_empty() || name == DEGRADED_OBJECT {
        None
    } else {
        Some(name)
    }
}

fn push_unique(out: &mut Vec<String>, name: String) {
    let name = name.trim().to_lowercase();
    if !name.is_empty() && name != DEGRADED_OBJECT && !out.contains(&name) {
        out.push(name);
    }
}

/// El payload y sus objetos anidados de usuario, en ese orden
fn candidate_objects(payload: &Value) -> Vec<&Map<String, Value>> {
    let mut objects = Vec::new();
    if let Value::Object(root) = payload {
        objects.push(root);
        for key in NESTED_KEYS {
            if let Some(Value::Object(nested)) = root.get(key) {
                objects.push(nested);
            }
        }
    }
    objects
}

/// Primer valor no nulo de cualquiera de las claves
pub fn find_key<'a>(payload: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    candidate_objects(payload).into_iter().find_map(|object| {
        keys.iter()
            .filter_map(|key| object.get(*key))
            .find(|value| !value.is_null() && !value.is_object())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn aliases() -> Vec<String> {
        vec!["admin".to_string(), "administrador".to_string()]
    }

    #[test]
    fn test_mixed_module_entries() {
        let payload = json!({
            "token": "t",
            "modulos": [
                "Incidencias",
                {"NOMBRE": "Movilidad"},
                {"nombre": " Cajas "},
                {"id": 14},
                {"codigo": "PERMISOS"},
                {"otra_cosa": true},
                {"NOMBRE": ""},
                null,
            ]
        });
        assert_eq!(
            extract_modules(&payload),
            vec!["incidencias", "movilidad", "cajas", "14", "permisos"]
        );
    }

    #[test]
    fn test_modules_under_nested_user_and_other_keys() {
        let payload = json!({
            "user": {"permissions": ["ventas", "VENTAS"], "MENUS": "reportes, cajas"},
            "modules": [{"name": "Solicitudes"}]
        });
        assert_eq!(
            extract_modules(&payload),
            vec!["solicitudes", "ventas", "reportes", "cajas"]
        );
    }

    #[test]
    fn test_module_name_drops_degraded_objects() {
        assert_eq!(module_name(&json!({"x": 1})), None);
        assert_eq!(module_name(&json!("[object Object]")), None);
        assert_eq!(module_name(&json!(true)), None);
        assert_eq!(module_name(&json!({"MODULO": "Flota"})).as_deref(), Some("flota"));
    }

    #[test]
    fn test_numeric_role_one_wins_first() {
        let payload = json!({"usuario": {"rol": 1, "usuario": "admin"}});
        let decision = infer_admin(&payload, &["cajas".to_string()], &aliases());
        assert!(decision.is_admin);
        assert_eq!(decision.matched, Some(AdminRule::NumericRoleOne));
    }

    #[test]
    fn test_role_name_contains_admin() {
        let payload = json!({"role": "SuperAdministrador", "username": "jperez"});
        let decision = infer_admin(&payload, &["cajas".to_string()], &aliases());
        assert_eq!(decision.matched, Some(AdminRule::RoleNameContainsAdmin));
    }

    #[test]
    fn test_username_alias() {
        let payload = json!({"rol": 3, "usuario": "Admin.Lima"});
        let decision = infer_admin(&payload, &["cajas".to_string()], &aliases());
        assert_eq!(decision.matched, Some(AdminRule::UsernameIsAdminAlias));
    }

    #[test]
    fn test_no_modules_assumed_admin() {
        let payload = json!({"rol": "operador", "usuario": "mrojas"});
        let decision = infer_admin(&payload, &[], &aliases());
        assert_eq!(decision.matched, Some(AdminRule::NoModules));
    }

    #[test]
    fn test_regular_user() {
        let payload = json!({"rol": "2", "usuario": "mrojas"});
        let decision = infer_admin(&payload, &["movilidad".to_string()], &aliases());
        assert!(!decision.is_admin);
        assert_eq!(decision.matched, None);
    }
}
