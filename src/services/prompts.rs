//! Prompt construction for each stage of the flow.
//!
//! Prompt text lives here and nowhere else; stages assemble these strings
//! into turn sequences and never embed instruction text inline.

/// Module path the generated suite imports from: the file name with any
/// directory prefix and the `.py` suffix stripped.
pub fn module_name(function_filename: &str) -> String {
    let base = function_filename.rsplit(['/', '\\']).next().unwrap_or(function_filename);
    base.strip_suffix(".py").unwrap_or(base).to_string()
}

pub fn explain_system() -> &'static str {
    "You are a world-class Python developer with an eagle eye for unintended bugs and edge cases. \
     You carefully explain code with great detail and accuracy. \
     You organize your explanations in markdown-formatted, bulleted lists."
}

pub fn explain_user(function_source: &str) -> String {
    format!(
        "Please explain the following Python function. Review what each element of the \
         function is doing precisely and what the author's intentions may have been. \
         Identify each logical branch and decision point, and discuss any potential edge \
         cases. Organize your explanation as a markdown-formatted, bulleted list.\n\n\
         ```python\n{function_source}\n```"
    )
}

pub fn plan_user(unit_test_package: &str) -> String {
    format!(
        "A good unit test suite should aim to:\n\
         - Test the function's behavior for a wide range of possible inputs\n\
         - Test edge cases that the author may not have foreseen\n\
         - Take advantage of the features of `{unit_test_package}` to make the tests easy to write and maintain\n\
         - Be easy to read and understand, with clean code and descriptive names\n\
         - Be deterministic, so that the tests always pass or fail in the same way\n\n\
         To help unit test the function above, list diverse scenarios that the function should \
         be able to handle (and under each scenario, include a few examples as sub-bullets)."
    )
}

pub fn elaboration_user(max_additional: u32) -> String {
    format!(
        "In addition to the scenarios above, list a maximum of {max_additional} rare or \
         unexpected edge cases (and as before, under each edge case, include a few examples \
         as sub-bullets)."
    )
}

pub fn synthesis_system() -> &'static str {
    "You are a world-class Python developer with an eagle eye for unintended bugs and edge cases. \
     You write careful, accurate unit tests. When asked to reply only with code, you write all \
     of your code in a single block."
}

pub fn synthesis_user(unit_test_package: &str, module: &str, import_name: &str) -> String {
    let package_comment = if unit_test_package == "pytest" {
        "# below, each test case is represented by a tuple passed to the @pytest.mark.parametrize decorator"
    } else {
        ""
    };
    format!(
        "Using Python and the `{unit_test_package}` package, write a suite of unit tests for \
         the function, following the cases above. Include helpful comments to explain each line. \
         Reply only with code, formatted as follows:\n\n\
         ```python\n\
         # imports\n\
         import {unit_test_package}  # used for our unit tests\n\
         {{insert other imports as needed}}\n\n\
         # function to test\n\
         from src.{module} import {import_name}\n\n\
         # unit tests\n\
         {package_comment}\n\
         {{insert unit test code here}}\n\
         ```\n\
         The imports and function to test part has to be exactly like that. However, make sure \
         to import all dependencies that you might add in the cases!"
    )
}

pub fn correction_system(test_module: &str, function_name: &str) -> String {
    format!(
        "A Python test file named {test_module} contains unit tests for the function \
         {function_name}. Your task is to modify or create {function_name} so it passes all of \
         these tests, preserving or enhancing every functionality of the original function \
         except the identified bugs.\n\n\
         Task:\n\
         1. Analyze the unit tests to fully understand the intended behavior of {function_name}.\n\
         2. Modify the Python code for {function_name} so it meets all test conditions.\n\
         3. Maintain the original function's capabilities, correcting only the faulty behaviors.\n\n\
         Reply with a single fenced code block containing the updated function. Ensure the code \
         is clean, well-commented, and follows standard Python conventions."
    )
}

pub fn correction_user(function_source: &str, test_results: &str, failed_cases: &str) -> String {
    format!(
        "Please correct the following Python function to make it pass the given unit tests. \
         The following are the test results and error messages:\n\n\
         Test results:\n{test_results}\n\n\
         Failed test cases:\n{failed_cases}\n\n\
         Ensure the corrected function maintains its intended functionality and fixes any bugs.\n\n\
         ```python\n{function_source}\n```"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name_strips_directories_and_suffix() {
        assert_eq!(module_name("src/inventory_manager.py"), "inventory_manager");
        assert_eq!(module_name("pig_latin.py"), "pig_latin");
        assert_eq!(module_name("a/b/c/util.py"), "util");
    }

    #[test]
    fn test_module_name_without_suffix_is_unchanged() {
        assert_eq!(module_name("src/already_stripped"), "already_stripped");
    }

    #[test]
    fn test_synthesis_user_pins_import_skeleton() {
        let prompt = synthesis_user("pytest", "inventory_manager", "InventoryManager");
        assert!(prompt.contains("import pytest"));
        assert!(prompt.contains("from src.inventory_manager import InventoryManager"));
        assert!(prompt.contains("@pytest.mark.parametrize"));
    }

    #[test]
    fn test_synthesis_user_omits_pytest_comment_for_other_packages() {
        let prompt = synthesis_user("unittest", "m", "f");
        assert!(!prompt.contains("@pytest.mark.parametrize"));
    }

    #[test]
    fn test_elaboration_user_carries_the_bound() {
        assert!(elaboration_user(3).contains("a maximum of 3"));
        assert!(elaboration_user(1).contains("a maximum of 1"));
    }
}
