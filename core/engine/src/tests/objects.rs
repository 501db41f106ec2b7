//! The object model: properties, attributes, prototypes, freezing.

use super::{run_test_actions, TestAction};
use crate::JsNativeErrorKind;
use indoc::indoc;

#[test]
fn object_literals() {
    run_test_actions([
        TestAction::assert_eq("({a: 1}).a", 1),
        TestAction::assert_eq("var v = 2; ({v}).v", 2),
        TestAction::assert_eq("({'with space': 3})['with space']", 3),
        TestAction::assert_eq("({1.5: 'x'})[1.5]", "x"),
        TestAction::assert_eq("({new: 'keyword'}).new", "keyword"),
    ]);
}

#[test]
fn literal_accessors() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var backing = 1;
            var o = {
                get value() { return backing; },
                set value(v) { backing = v * 2; }
            };
            o.value = 4;
            o.value
        "#},
        8,
    )]);
}

#[test]
fn keys_enumerate_in_insertion_order() {
    run_test_actions([
        TestAction::assert_eq(
            "Object.keys({b: 1, a: 2, c: 3}).join(',')",
            "b,a,c",
        ),
        TestAction::assert_eq(
            indoc! {r#"
                var o = {z: 1};
                o.y = 2;
                o.x = 3;
                delete o.y;
                o.y = 4;
                Object.keys(o).join(',')
            "#},
            "z,x,y",
        ),
    ]);
}

#[test]
fn define_property_getter_only() {
    run_test_actions([
        TestAction::assert_eq(
            "Object.defineProperty({}, 'a', {get: function() { return 1; }}).a",
            1,
        ),
        TestAction::assert_native_error(
            indoc! {r#"
                var o = Object.defineProperty({}, 'a', {get: function() { return 1; }});
                o.a = 2;
            "#},
            JsNativeErrorKind::Type,
            "Cannot set property \"a\" of object which has only a getter",
        ),
    ]);
}

#[test]
fn define_property_attributes() {
    run_test_actions([
        TestAction::assert_native_error(
            indoc! {r#"
                var o = {};
                Object.defineProperty(o, 'fixed', {value: 1, writable: false});
                o.fixed = 2;
            "#},
            JsNativeErrorKind::Type,
            "Cannot assign to read-only property \"fixed\" of object",
        ),
        TestAction::assert_eq(
            indoc! {r#"
                var o = {};
                Object.defineProperty(o, 'hidden', {value: 1, enumerable: false});
                o.visible = 2;
                Object.keys(o).join(',')
            "#},
            "visible",
        ),
        TestAction::assert_native_error(
            indoc! {r#"
                var o = {};
                Object.defineProperty(o, 'perm', {value: 1, configurable: false});
                delete o.perm;
            "#},
            JsNativeErrorKind::Type,
            "Cannot delete property \"perm\" of object",
        ),
    ]);
}

#[test]
fn get_own_property_descriptor_reports_attributes() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var o = {plain: 1};
            var d = Object.getOwnPropertyDescriptor(o, 'plain');
            d.value + ';' + d.writable + ';' + d.enumerable + ';' + d.configurable
        "#},
        "1;true;true;true",
    )]);
}

#[test]
fn delete_returns_true_for_absent_and_removes_own() {
    run_test_actions([
        TestAction::assert_eq("var o = {a: 1}; delete o.a", true),
        TestAction::assert_eq("var o = {a: 1}; delete o.missing", true),
        TestAction::assert_eq("var o = {a: 1}; delete o.a; o.a === undefined", true),
        TestAction::assert_eq("delete 1", true),
    ]);
}

#[test]
fn deleting_an_own_property_reveals_the_inherited_one() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function Base() {}
            Base.prototype.v = 'inherited';
            var o = new Base();
            o.v = 'own';
            var before = o.v;
            delete o.v;
            before + ';' + o.v
        "#},
        "own;inherited",
    )]);
}

#[test]
fn instance_members_can_be_deleted_and_shadowed() {
    // `fn.length` lives in the shared instance table; deleting it leaves a
    // whiteout that keeps shadowing it.
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function f(a, b) {}
            var before = f.length;
            delete f.length;
            before + ';' + f.length
        "#},
        "2;undefined",
    )]);
}

#[test]
fn prototype_mutation_through_dunder_proto() {
    run_test_actions([
        TestAction::assert_eq(
            indoc! {r#"
                var base = {greet: 'hi'};
                var o = {};
                o.__proto__ = base;
                o.greet
            "#},
            "hi",
        ),
        TestAction::assert_native_error(
            indoc! {r#"
                var a = {};
                var b = Object.create(a);
                a.__proto__ = b;
            "#},
            JsNativeErrorKind::Type,
            "Cyclic __proto__ value",
        ),
    ]);
}

#[test]
fn set_through_chain_respects_writability() {
    run_test_actions([TestAction::assert_native_error(
        indoc! {r#"
            var base = {};
            Object.defineProperty(base, 'fixed', {value: 1, writable: false});
            var o = Object.create(base);
            o.fixed = 2;
        "#},
        JsNativeErrorKind::Type,
        "Cannot assign to read-only property \"fixed\" of object",
    )]);
}

#[test]
fn freeze_and_seal() {
    run_test_actions([
        TestAction::assert("Object.isFrozen(Object.freeze({a: 1}))"),
        TestAction::assert_native_error(
            "var o = Object.freeze({a: 1}); o.a = 2;",
            JsNativeErrorKind::Type,
            "Cannot assign to read-only property \"a\" of object",
        ),
        TestAction::assert_native_error(
            "var o = Object.freeze({a: 1}); o.b = 2;",
            JsNativeErrorKind::Type,
            "Cannot add property \"b\", object is not extensible",
        ),
        TestAction::assert_native_error(
            "var o = Object.freeze({a: 1}); delete o.a;",
            JsNativeErrorKind::Type,
            "Cannot delete property \"a\" of object",
        ),
        // Sealed objects keep writable data properties.
        TestAction::assert_eq(
            "var o = Object.seal({a: 1}); o.a = 5; o.a",
            5,
        ),
        TestAction::assert("Object.isSealed(Object.seal({}))"),
        TestAction::assert("!Object.isFrozen(Object.seal({a: 1}))"),
        TestAction::assert_native_error(
            "var o = Object.seal({a: 1}); delete o.a;",
            JsNativeErrorKind::Type,
            "Cannot delete property \"a\" of object",
        ),
    ]);
}

#[test]
fn frozen_arrays_reject_every_mutation() {
    run_test_actions([
        TestAction::assert_native_error(
            "var a = Object.freeze([1, 2]); a[0] = 9;",
            JsNativeErrorKind::Type,
            "Cannot assign to read-only property \"0\" of array",
        ),
        TestAction::assert_native_error(
            "var a = Object.freeze([1, 2]); a.push(3);",
            JsNativeErrorKind::Type,
            "Cannot assign to read-only property \"2\" of array",
        ),
        TestAction::assert("Object.isFrozen(Object.freeze([1, 2]))"),
    ]);
}

#[test]
fn extensibility() {
    run_test_actions([
        TestAction::assert("Object.isExtensible({})"),
        TestAction::assert("!Object.isExtensible(Object.preventExtensions({}))"),
        TestAction::assert_native_error(
            "var o = Object.preventExtensions({}); o.fresh = 1;",
            JsNativeErrorKind::Type,
            "Cannot add property \"fresh\", object is not extensible",
        ),
    ]);
}

#[test]
fn has_own_property_and_enumerability() {
    run_test_actions([
        TestAction::assert("({a: 1}).hasOwnProperty('a')"),
        TestAction::assert("!({a: 1}).hasOwnProperty('toString')"),
        TestAction::assert("({a: 1}).propertyIsEnumerable('a')"),
        TestAction::assert("![].propertyIsEnumerable('length')"),
    ]);
}

#[test]
fn object_create_and_prototypes() {
    run_test_actions([
        TestAction::assert("Object.getPrototypeOf({}) === Object.prototype"),
        TestAction::assert("Object.getPrototypeOf(Object.create(null)) === null"),
        TestAction::assert(
            "var proto = {}; Object.getPrototypeOf(Object.create(proto)) === proto",
        ),
        TestAction::assert("Array.prototype.__proto__ === Object.prototype"),
        TestAction::assert("TypeError.prototype.__proto__ === Error.prototype"),
        TestAction::assert("Array.__proto__ === Function.prototype"),
    ]);
}

#[test]
fn array_length_protocol() {
    run_test_actions([
        TestAction::assert_eq("var a = [1, 2, 3]; a.length", 3),
        TestAction::assert_eq("var a = [1, 2, 3]; a[10] = 1; a.length", 11),
        TestAction::assert_eq("var a = [1, 2, 3]; a.length = 1; a[1] === undefined", true),
        TestAction::assert_eq("var a = [1, 2, 3]; a.length = 5; a.length", 5),
        TestAction::assert_native_error(
            "var a = []; a.length = -1;",
            JsNativeErrorKind::Range,
            "Invalid array length",
        ),
        TestAction::assert_native_error(
            "var a = []; a.length = 1.5;",
            JsNativeErrorKind::Range,
            "Invalid array length",
        ),
    ]);
}

#[test]
fn string_wrapper_projects_code_points() {
    run_test_actions([
        TestAction::assert_eq("'abc'[1]", "b"),
        TestAction::assert_eq("'αβγ'[2]", "γ"),
        TestAction::assert_eq("'abc'[5] === undefined", true),
        TestAction::assert_native_error(
            "var s = new String('abc'); s[0] = 'z';",
            JsNativeErrorKind::Type,
            "property set on primitive string type",
        ),
    ]);
}

#[test]
fn to_string_tags() {
    run_test_actions([
        TestAction::assert_eq("({}).toString()", "[object Object]"),
        TestAction::assert_eq("Object.prototype.toString.call([])", "[object Array]"),
        TestAction::assert_eq("Object.prototype.toString.call(null)", "[object Null]"),
        TestAction::assert_eq("Object.prototype.toString.call(7)", "[object Number]"),
    ]);
}
